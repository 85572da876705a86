// src/dag/mod.rs

//! Dependency graph representation and the static analyses run before a
//! build starts.
//!
//! - [`graph`] holds the targets, their recipes and their build state.
//! - [`cycle`] rejects goals whose dependency closure is cyclic.
//! - [`order`] produces the dependencies-first seed order for the scheduler.

pub mod cycle;
pub mod graph;
pub mod order;

pub use cycle::{find_cycle, has_cycle};
pub use graph::{DependencyGraph, ROOT_TARGET, Target, TargetId};
pub use order::build_order;
