//! Remote persistence client for plan nodes.
//!
//! # Responsibility
//! - Define the async seam (`NodeSync`) the workspace service edits
//!   through.
//! - Provide the HTTP implementation speaking the nodes-service protocol.
//!
//! # Invariants
//! - Every remote call acquires a fresh bearer token first; a missing
//!   token fails the call before any network attempt.
//! - Implementations never mutate local workspace state; callers commit
//!   tree changes only after a success result.

pub mod client;
pub mod token;
