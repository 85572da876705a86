// src/build/report.rs

//! Summary of a finished build.

use crate::types::RuleState;

/// Final state of one requested goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalOutcome {
    pub name: String,
    pub state: RuleState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Goals dropped before scheduling because their closure is cyclic.
    pub dropped_goals: Vec<String>,
    /// Goals that were scheduled, with the state they ended in.
    pub goals: Vec<GoalOutcome>,
    /// Number of rules whose recipe was executed.
    pub rules_run: usize,
}

impl BuildReport {
    /// True when no goal was dropped and every scheduled goal succeeded.
    pub fn succeeded(&self) -> bool {
        self.dropped_goals.is_empty()
            && self.goals.iter().all(|g| g.state == RuleState::Success)
    }

    pub fn state_of(&self, goal: &str) -> Option<RuleState> {
        self.goals.iter().find(|g| g.name == goal).map(|g| g.state)
    }
}
