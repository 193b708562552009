//! Workspace use-case orchestration.
//!
//! # Responsibility
//! - Drive remote-confirmed edit flows over the plan tree.
//! - Expose the read model (tree, selection, loading flag) rendering
//!   surfaces observe.

pub mod workspace_service;
