// src/exec/mod.rs

//! Command execution layer.
//!
//! - [`backend`] defines the `CommandRunner` trait the scheduler's workers
//!   call for every recipe line.
//! - [`task_runner`] provides `ShellRunner`, the production implementation
//!   built on `std::process::Command`.

pub mod backend;
pub mod task_runner;

pub use backend::CommandRunner;
pub use task_runner::ShellRunner;
