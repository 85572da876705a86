// src/exec/task_runner.rs

//! Shell-backed command runner.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::exec::CommandRunner;
use crate::types::CommandOutcome;

/// Runs each command through the platform shell, inheriting stdout and
/// stderr so recipe output reaches the terminal directly.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    dir: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command with `dir` as its working directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn shell_command(&self, command: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };

        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, target: &str, command: &str) -> Result<CommandOutcome> {
        info!(rule = %target, command = %command, "running command");

        let status = self
            .shell_command(command)
            .status()
            .with_context(|| format!("spawning shell for target '{}'", target))?;

        let code = status.code().unwrap_or(-1);
        debug!(
            rule = %target,
            exit_code = code,
            success = status.success(),
            "command exited"
        );

        Ok(if status.success() {
            CommandOutcome::Success
        } else {
            CommandOutcome::Failed(code)
        })
    }
}
