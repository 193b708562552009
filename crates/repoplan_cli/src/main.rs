//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `repoplan_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use repoplan_core::{PlanTree, Viewport};

fn main() {
    println!("repoplan_core ping={}", repoplan_core::ping());
    println!("repoplan_core version={}", repoplan_core::core_version());

    let tree = PlanTree::new_empty();
    let viewport = Viewport::new();
    println!(
        "empty workspace nodes={} root={} scale={}",
        tree.node_count(),
        tree.root().id,
        viewport.transform().scale
    );
}
