//! Core domain logic for RepoPlan workspaces.
//! This crate is the single source of truth for plan-tree invariants.

pub mod logging;
pub mod model;
pub mod service;
pub mod session;
pub mod sync;
pub mod viewport;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::node::{
    DEFAULT_NODE_DESCRIPTION, DEFAULT_NODE_NAME, NodeId, PlanNode, ROOT_NODE_ID,
};
pub use model::tree::{PlanTree, TreeError, TreeResult};
pub use service::workspace_service::{ServiceError, ServiceResult, WorkspaceService};
pub use session::{Session, SessionUser};
pub use sync::client::{CreatedNode, HttpNodeSync, NodeSync, SyncError, SyncResult};
pub use sync::token::TokenProvider;
pub use viewport::{MAX_SCALE, MIN_SCALE, PointerTarget, SCALE_STEP, ViewTransform, Viewport};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
