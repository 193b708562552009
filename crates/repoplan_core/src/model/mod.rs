//! Domain model for repository planning workspaces.
//!
//! # Responsibility
//! - Define the canonical plan-node record and the rooted tree value.
//! - Keep every tree mutation pure so callers can hold on to prior values.
//!
//! # Invariants
//! - Every node is identified by a stable, service-assigned `NodeId`.
//! - A tree always has exactly one root carrying the reserved root id.

pub mod node;
pub mod tree;
