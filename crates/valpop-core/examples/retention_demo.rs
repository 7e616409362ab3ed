//! Retention Policy Demonstration
//!
//! Evaluates both retention shapes over hand-built listings and prints what
//! a collector would delete.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Run with `cargo run -p valpop-core --example retention_demo`.

use std::collections::BTreeSet;
use valpop_core::retention::{evaluate_per_path, evaluate_reachability};
use valpop_core::{GenerationId, GenerationIndex, Namespace, RelativePath, RetentionPolicy};

fn paths(raw: &[&str]) -> BTreeSet<RelativePath> {
    raw.iter().map(|p| RelativePath::new(*p).unwrap()).collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== valpop Retention Demo ===\n");

    // ===== Part 1: Per-path (key-value backend) =====
    println!("## Part 1: Per-path, min_keep=2 max_age=30 now=45\n");

    let mut index = GenerationIndex::new(Namespace::new("app1")?);
    for seconds in [0, 10, 20, 40] {
        index.insert(GenerationId::new(seconds), RelativePath::new("index.html")?);
    }

    let policy = RetentionPolicy::try_new(2, 30)?;
    let plan = evaluate_per_path(&policy, 45, &index);
    for (path, generations) in &plan.retained {
        println!("retain {} at {:?}", path, generations);
    }
    for (path, generations) in &plan.expired {
        println!("delete {} at {:?}", path, generations);
    }

    // ===== Part 2: Reachability (object store) =====
    println!("\n## Part 2: Reachability, min_keep=1 max_age=10 now=60\n");

    let mut index = GenerationIndex::new(Namespace::new("app1")?);
    index.insert_generation(GenerationId::new(0), paths(&["a.js", "shared.js", "fedmods.json"]));
    index.insert_generation(GenerationId::new(50), paths(&["b.js", "shared.js"]));

    let policy = RetentionPolicy::try_new(1, 10)?;
    let plan = evaluate_reachability(&policy, 60, &index);
    println!("retained generations: {:?}", plan.retained);
    println!("expired generations:  {:?}", plan.expired);
    for path in &plan.paths_to_delete {
        println!("delete {}", path);
    }
    println!("(fedmods.json is protected and stays)");

    Ok(())
}
