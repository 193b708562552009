//! Plan tree value and its pure mutation operations.
//!
//! # Responsibility
//! - Hold the node hierarchy of one repository workspace as a value.
//! - Provide add/remove/toggle operations that build new tree values.
//!
//! # Invariants
//! - The root is held by value, so a tree without a root is not
//!   representable; `remove_subtree` additionally rejects the root id.
//! - Node ids are unique; every non-root node is reachable through
//!   exactly one parent's `children`.
//! - Mutations never modify `self`; callers keep the previous value and
//!   commit the returned one only when the matching remote call succeeds.

use crate::model::node::{NodeId, PlanNode, ROOT_NODE_ID};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by pure tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors from pure tree operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Target node id is not present in this tree.
    NodeNotFound(NodeId),
    /// The reserved root node cannot be removed.
    CannotDeleteRoot,
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "plan node not found: {id}"),
            Self::CannotDeleteRoot => write!(f, "the root node cannot be deleted"),
        }
    }
}

impl Error for TreeError {}

/// Rooted hierarchy of plan nodes for one repository workspace.
///
/// Operations return fresh trees instead of editing in place; after a
/// failed remote call the caller keeps the previous value unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTree {
    root: PlanNode,
}

impl PlanTree {
    /// Creates the empty workspace: a fresh root with no children.
    pub fn new_empty() -> Self {
        Self {
            root: PlanNode::new_root(),
        }
    }

    /// Wraps a root node fetched from the remote service.
    pub fn from_root(root: PlanNode) -> Self {
        Self { root }
    }

    /// Root node of this workspace.
    pub fn root(&self) -> &PlanNode {
        &self.root
    }

    /// Depth-first lookup by id anywhere in the tree.
    pub fn find_node(&self, node_id: &str) -> Option<&PlanNode> {
        self.root.find_descendant(node_id)
    }

    /// Returns whether `node_id` is present in the tree.
    pub fn contains(&self, node_id: &str) -> bool {
        self.find_node(node_id).is_some()
    }

    /// Total number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.root.subtree_len()
    }

    /// Returns a new tree with `node` appended to `parent_id`'s children.
    ///
    /// Sibling order is preserved; the new node becomes the last child.
    pub fn add_child(&self, parent_id: &str, node: PlanNode) -> TreeResult<PlanTree> {
        let mut next = self.clone();
        match find_mut(&mut next.root, parent_id) {
            Some(parent) => {
                parent.children.push(node);
                Ok(next)
            }
            None => Err(TreeError::NodeNotFound(parent_id.to_string())),
        }
    }

    /// Returns a new tree with `node_id` and its whole subtree excised.
    pub fn remove_subtree(&self, node_id: &str) -> TreeResult<PlanTree> {
        if node_id == ROOT_NODE_ID {
            return Err(TreeError::CannotDeleteRoot);
        }
        let mut next = self.clone();
        if detach_subtree(&mut next.root, node_id) {
            Ok(next)
        } else {
            Err(TreeError::NodeNotFound(node_id.to_string()))
        }
    }

    /// Returns a new tree with `expanded` flipped on the located node.
    ///
    /// Collapsing only hides children on the rendering surface; the model
    /// keeps them.
    pub fn toggle_expanded(&self, node_id: &str) -> TreeResult<PlanTree> {
        let mut next = self.clone();
        match find_mut(&mut next.root, node_id) {
            Some(node) => {
                node.expanded = !node.expanded;
                Ok(next)
            }
            None => Err(TreeError::NodeNotFound(node_id.to_string())),
        }
    }
}

fn find_mut<'a>(current: &'a mut PlanNode, node_id: &str) -> Option<&'a mut PlanNode> {
    if current.id == node_id {
        return Some(current);
    }
    for child in current.children.iter_mut() {
        if let Some(found) = find_mut(child, node_id) {
            return Some(found);
        }
    }
    None
}

fn detach_subtree(current: &mut PlanNode, node_id: &str) -> bool {
    if let Some(index) = current.children.iter().position(|child| child.id == node_id) {
        current.children.remove(index);
        return true;
    }
    for child in current.children.iter_mut() {
        if detach_subtree(child, node_id) {
            return true;
        }
    }
    false
}
