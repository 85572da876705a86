use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use parmake::exec::CommandRunner;
use parmake::fs::mock::MockFileSystem;
use parmake::types::CommandOutcome;

/// One command handed to the runner, in start order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed {
    pub target: String,
    pub command: String,
}

/// A fake command runner that:
/// - records every command it is asked to run, in start order
/// - reports `Failed(1)` for configured commands and `Success` otherwise
/// - refuses to start configured commands, returning an error
/// - optionally sleeps to widen race windows
/// - optionally applies `touch <file>...` commands to a `MockFileSystem`
///
/// Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    executed: Arc<Mutex<Vec<Executed>>>,
    failing: HashSet<String>,
    unstartable: HashSet<String>,
    delay: Option<Duration>,
    fs: Option<MockFileSystem>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_string());
        self
    }

    pub fn unstartable(mut self, command: &str) -> Self {
        self.unstartable.insert(command.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn touching(mut self, fs: MockFileSystem) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.executed().into_iter().map(|e| e.command).collect()
    }

    /// Targets in the order their first command started.
    pub fn targets(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for e in self.executed() {
            if !seen.contains(&e.target) {
                seen.push(e.target);
            }
        }
        seen
    }

    pub fn runs_of(&self, target: &str) -> usize {
        self.executed()
            .iter()
            .filter(|e| e.target == target)
            .count()
    }

    /// Highest number of commands that were running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, target: &str, command: &str) -> anyhow::Result<CommandOutcome> {
        self.executed.lock().unwrap().push(Executed {
            target: target.to_string(),
            command: command.to_string(),
        });

        if self.unstartable.contains(command) {
            return Err(anyhow!("cannot start '{command}'"));
        }

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(command) {
            return Ok(CommandOutcome::Failed(1));
        }

        if let (Some(fs), Some(files)) = (&self.fs, command.strip_prefix("touch ")) {
            for file in files.split_whitespace() {
                fs.touch(file);
            }
        }

        Ok(CommandOutcome::Success)
    }
}
