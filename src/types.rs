// src/types.rs

use std::fmt;

/// Build state of a single rule.
///
/// Every rule starts out `Pending` and moves exactly once to one of the two
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleState {
    #[default]
    Pending,
    Success,
    Failed,
}

impl RuleState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RuleState::Pending)
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleState::Pending => "pending",
            RuleState::Success => "success",
            RuleState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of running a single recipe command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failed(i32),
}

impl CommandOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}
