//! Plan node domain model.
//!
//! # Responsibility
//! - Define the planning-unit record shared by tree, sync and service layers.
//! - Keep the serde shape aligned with the remote nodes service schema.
//!
//! # Invariants
//! - `id` is assigned by the remote service and never changes afterwards.
//! - The root node carries the reserved root id and has no remote key.
//! - `expanded` is client-side view state; collapsing never drops children.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Reserved identifier of every workspace root.
pub const ROOT_NODE_ID: &str = "root";

/// Display name given to nodes the service just created.
pub const DEFAULT_NODE_NAME: &str = "New Node";
/// Description given to nodes the service just created.
pub const DEFAULT_NODE_DESCRIPTION: &str = "New node description";

const ROOT_NODE_NAME: &str = "Root Node";
const ROOT_NODE_DESCRIPTION: &str = "This is the root node";

/// Stable identifier for every node in a workspace tree.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// The value space is opaque to this crate except for [`ROOT_NODE_ID`].
pub type NodeId = String;

/// One planning unit inside a repository workspace.
///
/// Serialized field names follow the remote service's camelCase schema,
/// so a fetched tree deserializes directly into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanNode {
    /// Stable logical id; [`ROOT_NODE_ID`] for the root, service-assigned
    /// for every other node.
    pub id: NodeId,
    /// Storage-layer key used only when addressing the remote service.
    /// `None` for the root node.
    #[serde(rename = "firebaseKey", default, skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    /// User-facing label.
    pub name: String,
    /// Free-form annotation shown in detail views.
    pub description: String,
    /// ISO-8601 creation stamp. Kept as opaque text; the service and this
    /// client stamp in slightly different shapes and neither parses the
    /// other's values.
    pub created_at: String,
    /// ISO-8601 last-change stamp. Opaque text, same as `created_at`.
    pub last_modified: String,
    /// Whether the rendering surface shows this node's children.
    #[serde(rename = "isOpen")]
    pub expanded: bool,
    /// Child nodes in display order.
    #[serde(default)]
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates the synthetic root used before any remote data exists.
    ///
    /// # Invariants
    /// - The id is always [`ROOT_NODE_ID`] and there is no remote key.
    /// - The root starts expanded with no children.
    pub fn new_root() -> Self {
        let stamp = now_timestamp();
        Self {
            id: ROOT_NODE_ID.to_string(),
            remote_key: None,
            name: ROOT_NODE_NAME.to_string(),
            description: ROOT_NODE_DESCRIPTION.to_string(),
            created_at: stamp.clone(),
            last_modified: stamp,
            expanded: true,
            children: Vec::new(),
        }
    }

    /// Creates the local record for a node the remote service just
    /// allocated.
    ///
    /// The service owns `id` and `remote_key`; the client contributes the
    /// default texts and its own timestamps.
    pub fn from_created(id: impl Into<NodeId>, remote_key: impl Into<String>) -> Self {
        let stamp = now_timestamp();
        Self {
            id: id.into(),
            remote_key: Some(remote_key.into()),
            name: DEFAULT_NODE_NAME.to_string(),
            description: DEFAULT_NODE_DESCRIPTION.to_string(),
            created_at: stamp.clone(),
            last_modified: stamp,
            expanded: true,
            children: Vec::new(),
        }
    }

    /// Returns whether this is the reserved root node.
    pub fn is_root(&self) -> bool {
        self.id == ROOT_NODE_ID
    }

    /// Depth-first lookup within this node's subtree, including itself.
    ///
    /// Ids are unique per tree, so the first match is the only match.
    pub fn find_descendant(&self, node_id: &str) -> Option<&PlanNode> {
        if self.id == node_id {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find_descendant(node_id) {
                return Some(found);
            }
        }
        None
    }

    /// Number of nodes in this subtree, including this node.
    pub fn subtree_len(&self) -> usize {
        let mut count = 1;
        for child in &self.children {
            count += child.subtree_len();
        }
        count
    }
}

/// Returns the current UTC time as an RFC 3339 string.
///
/// Formatting a UTC instant cannot fail in practice; the epoch fallback
/// keeps display metadata from ever aborting an edit flow.
pub(crate) fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
