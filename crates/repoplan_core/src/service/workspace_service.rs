//! Workspace service for one repository's plan tree.
//!
//! # Responsibility
//! - Orchestrate load/add/delete/toggle flows against the remote node
//!   store.
//! - Own the tree, the selection and the loading flag for one
//!   repository view.
//!
//! # Invariants
//! - Edits commit locally only after the matching remote call succeeded;
//!   there is no optimistic insertion or deletion.
//! - Remote-editing methods take `&mut self`, so edits on one workspace
//!   are serialized by the borrow rather than by a queue.
//! - A failed remote call leaves tree, selection and repository binding
//!   exactly as they were.

use crate::model::node::{NodeId, PlanNode, ROOT_NODE_ID};
use crate::model::tree::{PlanTree, TreeError};
use crate::sync::client::{NodeSync, SyncError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by workspace service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced to rendering surfaces by workspace operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No repository workspace has been loaded yet.
    NotLoaded,
    /// Target node id is not present in the loaded tree.
    NodeNotFound(NodeId),
    /// The root node cannot be deleted.
    CannotDeleteRoot,
    /// Remote call failed; the local tree was left untouched.
    Sync(SyncError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no repository workspace is loaded"),
            Self::NodeNotFound(id) => write!(f, "plan node not found: {id}"),
            Self::CannotDeleteRoot => write!(f, "the root node cannot be deleted"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SyncError> for ServiceError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

impl From<TreeError> for ServiceError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::NodeNotFound(id) => Self::NodeNotFound(id),
            TreeError::CannotDeleteRoot => Self::CannotDeleteRoot,
        }
    }
}

/// Orchestrates one repository's planning workspace.
///
/// Holds no tree until [`load`](Self::load) succeeds; edit and select
/// calls before that fail with [`ServiceError::NotLoaded`].
pub struct WorkspaceService<S: NodeSync> {
    sync: S,
    repo: Option<String>,
    tree: Option<PlanTree>,
    selection: Option<NodeId>,
    is_loading: bool,
}

impl<S: NodeSync> WorkspaceService<S> {
    /// Creates a service over a remote node store.
    pub fn new(sync: S) -> Self {
        Self {
            sync,
            repo: None,
            tree: None,
            selection: None,
            is_loading: false,
        }
    }

    /// Repository whose workspace is currently loaded, if any.
    pub fn repo_name(&self) -> Option<&str> {
        self.repo.as_deref()
    }

    /// Current tree, once a load has completed.
    pub fn tree(&self) -> Option<&PlanTree> {
        self.tree.as_ref()
    }

    /// Id of the currently selected node, if any.
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Currently selected node record, if the selection is set.
    pub fn selected_node(&self) -> Option<&PlanNode> {
        let tree = self.tree.as_ref()?;
        tree.find_node(self.selection.as_deref()?)
    }

    /// Returns whether a workspace load is in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Loads the workspace for `repo_name`, replacing any previous tree
    /// and clearing the selection.
    ///
    /// A repository with no persisted tree yet yields the empty
    /// workspace (a bare root). Any other failure keeps the previously
    /// loaded workspace, selection and repository binding untouched.
    pub async fn load(&mut self, repo_name: &str) -> ServiceResult<()> {
        self.is_loading = true;
        let fetched = self.sync.fetch_tree(repo_name).await;
        self.is_loading = false;

        let tree = match fetched {
            Ok(root) => PlanTree::from_root(root),
            Err(SyncError::TreeMissing) => PlanTree::new_empty(),
            Err(err) => {
                error!(
                    "event=workspace_load module=service status=error repo={repo_name} error_code=workspace_load_failed error={err}"
                );
                return Err(err.into());
            }
        };

        info!(
            "event=workspace_load module=service status=ok repo={repo_name} nodes={}",
            tree.node_count()
        );
        self.repo = Some(repo_name.to_string());
        self.tree = Some(tree);
        self.selection = None;
        Ok(())
    }

    /// Selects `node_id` for detail display.
    pub fn select(&mut self, node_id: &str) -> ServiceResult<()> {
        let tree = self.loaded_tree()?;
        if !tree.contains(node_id) {
            return Err(ServiceError::NodeNotFound(node_id.to_string()));
        }
        self.selection = Some(node_id.to_string());
        Ok(())
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Creates a node under `parent_id`: the remote store first, the
    /// local tree only after success.
    ///
    /// Returns the id the service assigned to the new node. An unknown
    /// parent fails before any remote call is made.
    pub async fn add_node(&mut self, parent_id: &str) -> ServiceResult<NodeId> {
        let repo = self.repo.clone().ok_or(ServiceError::NotLoaded)?;
        if !self.loaded_tree()?.contains(parent_id) {
            return Err(ServiceError::NodeNotFound(parent_id.to_string()));
        }

        let created = match self.sync.create_node(&repo, parent_id).await {
            Ok(created) => created,
            Err(err) => {
                error!(
                    "event=node_add module=service status=error repo={repo} parent={parent_id} error_code=node_add_failed error={err}"
                );
                return Err(err.into());
            }
        };

        let node_id = created.node_id.clone();
        let node = PlanNode::from_created(created.node_id, created.firebase_key);
        let next = self.loaded_tree()?.add_child(parent_id, node)?;
        self.tree = Some(next);
        info!(
            "event=node_add module=service status=ok repo={repo} parent={parent_id} node={node_id}"
        );
        Ok(node_id)
    }

    /// Deletes `node_id` and its subtree: the remote store first, the
    /// local tree only after success.
    ///
    /// The root and unknown ids are rejected before any remote call. A
    /// selection pointing into the removed subtree is cleared.
    pub async fn delete_node(&mut self, node_id: &str) -> ServiceResult<()> {
        let repo = self.repo.clone().ok_or(ServiceError::NotLoaded)?;
        if node_id == ROOT_NODE_ID {
            return Err(ServiceError::CannotDeleteRoot);
        }
        if !self.loaded_tree()?.contains(node_id) {
            return Err(ServiceError::NodeNotFound(node_id.to_string()));
        }

        if let Err(err) = self.sync.delete_node(&repo, node_id).await {
            error!(
                "event=node_remove module=service status=error repo={repo} node={node_id} error_code=node_remove_failed error={err}"
            );
            return Err(err.into());
        }

        let next = self.loaded_tree()?.remove_subtree(node_id)?;
        let removed = self.loaded_tree()?.node_count() - next.node_count();
        let selection_removed = self
            .selection
            .as_deref()
            .is_some_and(|selected| !next.contains(selected));
        if selection_removed {
            self.selection = None;
        }
        self.tree = Some(next);
        info!(
            "event=node_remove module=service status=ok repo={repo} node={node_id} removed={removed}"
        );
        Ok(())
    }

    /// Flips the expanded flag of `node_id`.
    ///
    /// Purely local view state; no remote call is involved and children
    /// stay in the model while collapsed.
    pub fn toggle_expand(&mut self, node_id: &str) -> ServiceResult<()> {
        let next = self.loaded_tree()?.toggle_expanded(node_id)?;
        self.tree = Some(next);
        Ok(())
    }

    fn loaded_tree(&self) -> ServiceResult<&PlanTree> {
        self.tree.as_ref().ok_or(ServiceError::NotLoaded)
    }
}
