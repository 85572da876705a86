// src/exec/backend.rs

//! Pluggable command execution.
//!
//! The scheduler's workers hand each recipe line to a `CommandRunner`
//! instead of spawning processes themselves. Production code uses
//! [`ShellRunner`](super::ShellRunner); tests provide runners that record
//! the commands and report canned outcomes without spawning anything.

use anyhow::Result;

use crate::types::CommandOutcome;

/// Trait abstracting how a single recipe command is executed.
///
/// `run` blocks until the command has finished. It is called concurrently
/// from several worker threads.
pub trait CommandRunner: Send + Sync {
    /// Run `command`, which belongs to the recipe of `target`.
    ///
    /// An `Err` means the command could not be started at all; the caller
    /// treats it like a failed command.
    fn run(&self, target: &str, command: &str) -> Result<CommandOutcome>;
}
