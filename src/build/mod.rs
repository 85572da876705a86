// src/build/mod.rs

//! Parallel execution of a dependency graph.
//!
//! - [`oracle`] decides, for one rule, whether it must run, can be skipped,
//!   is blocked, already finished or failed through a dependency.
//! - [`scheduler`] owns the worker pool and the shared candidate list.
//! - [`report`] summarises the outcome for the caller.

pub mod oracle;
pub mod report;
pub mod scheduler;

pub use oracle::{Decision, decide};
pub use report::{BuildReport, GoalOutcome};
pub use scheduler::Scheduler;
