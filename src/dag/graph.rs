// src/dag/graph.rs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::warn;

use crate::types::RuleState;

/// Handle to a target inside a [`DependencyGraph`].
pub type TargetId = NodeIndex;

/// Name of the synthetic root target whose dependencies are the goals.
pub const ROOT_TARGET: &str = "";

/// A rule from the makefile: a target name plus its recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub commands: Vec<String>,
}

impl Target {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            commands: Vec::new(),
        }
    }
}

/// Dependency graph of build targets.
///
/// Edges point from a target to the targets it depends on. The structure is
/// frozen once construction is done; afterwards only the per-target
/// [`RuleState`] changes, and every read or write of it goes through the
/// single state lock shared by all targets.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<Target, ()>,
    index: HashMap<String, TargetId>,
    root: TargetId,
    states: Mutex<Vec<RuleState>>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraph {
    /// Create a graph holding only the root target.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(Target::new(ROOT_TARGET));
        let mut index = HashMap::new();
        index.insert(ROOT_TARGET.to_string(), root);

        Self {
            graph,
            index,
            root,
            states: Mutex::new(vec![RuleState::Pending]),
        }
    }

    /// Add a target with no commands, or return the existing one.
    pub fn add_target(&mut self, name: &str) -> TargetId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }

        let id = self.graph.add_node(Target::new(name));
        self.index.insert(name.to_string(), id);
        self.states
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RuleState::Pending);
        id
    }

    /// Record that `target` depends on `dependency`. Repeated edges collapse.
    pub fn add_dependency(&mut self, target: TargetId, dependency: TargetId) {
        self.graph.update_edge(target, dependency, ());
    }

    /// Add `goal` to the dependencies of the root target.
    pub fn add_goal(&mut self, goal: TargetId) {
        self.graph.update_edge(self.root, goal, ());
    }

    pub fn set_commands(&mut self, id: TargetId, commands: Vec<String>) {
        self.graph[id].commands = commands;
    }

    pub(crate) fn target_mut(&mut self, id: TargetId) -> &mut Target {
        &mut self.graph[id]
    }

    pub fn root(&self) -> TargetId {
        self.root
    }

    /// The requested goals, in the order they were added.
    pub fn goals(&self) -> Vec<TargetId> {
        self.dependencies(self.root)
    }

    pub fn goal_names(&self) -> Vec<String> {
        self.goals()
            .into_iter()
            .map(|id| self.name(id).to_string())
            .collect()
    }

    pub fn id_of(&self, name: &str) -> Option<TargetId> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn target(&self, id: TargetId) -> &Target {
        &self.graph[id]
    }

    pub fn name(&self, id: TargetId) -> &str {
        &self.graph[id].name
    }

    /// Direct dependencies of `id`, in the order they were declared.
    pub fn dependencies(&self, id: TargetId) -> Vec<TargetId> {
        // petgraph yields the most recently added edge first.
        let mut deps: Vec<TargetId> = self
            .graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        deps.reverse();
        deps
    }

    /// All targets except the root.
    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.graph
            .node_indices()
            .filter(move |&id| id != self.root)
            .map(move |id| (id, &self.graph[id]))
    }

    /// Number of targets, not counting the root.
    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Underlying petgraph structure, for diagnostics and tests.
    pub fn as_petgraph(&self) -> &DiGraph<Target, ()> {
        &self.graph
    }

    pub fn state(&self, id: TargetId) -> RuleState {
        self.lock_states()[id.index()]
    }

    pub fn state_of(&self, name: &str) -> Option<RuleState> {
        self.id_of(name).map(|id| self.state(id))
    }

    /// Run `f` against every target's state while holding the state lock.
    pub(crate) fn with_states<T>(&self, f: impl FnOnce(&[RuleState]) -> T) -> T {
        let states = self.lock_states();
        f(&states)
    }

    /// Move a pending target into a terminal state.
    ///
    /// Returns `false` and leaves the state untouched if the target already
    /// reached a terminal state.
    pub(crate) fn transition(&self, id: TargetId, to: RuleState) -> bool {
        let mut states = self.lock_states();
        let slot = &mut states[id.index()];
        if slot.is_terminal() {
            warn!(
                rule = %self.graph[id].name,
                current = %slot,
                requested = %to,
                "ignoring state change of a finished rule"
            );
            return false;
        }
        *slot = to;
        true
    }

    fn lock_states(&self) -> MutexGuard<'_, Vec<RuleState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_dependencies_are_the_goals_in_order() {
        let mut g = DependencyGraph::new();
        let a = g.add_target("a");
        let b = g.add_target("b");
        g.add_goal(b);
        g.add_goal(a);

        assert_eq!(g.goal_names(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(g.len(), 2);
        assert_eq!(g.name(g.root()), ROOT_TARGET);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut g = DependencyGraph::new();
        let a = g.add_target("a");
        let b = g.add_target("b");
        let c = g.add_target("c");
        g.add_dependency(a, c);
        g.add_dependency(a, b);
        g.add_dependency(a, c);

        assert_eq!(g.dependencies(a), vec![c, b]);
        assert_eq!(g.add_target("a"), a);
    }

    #[test]
    fn terminal_state_is_write_once() {
        let mut g = DependencyGraph::new();
        let a = g.add_target("a");

        assert_eq!(g.state(a), RuleState::Pending);
        assert!(g.transition(a, RuleState::Failed));
        assert!(!g.transition(a, RuleState::Success));
        assert_eq!(g.state_of("a"), Some(RuleState::Failed));
        assert_eq!(g.state_of("missing"), None);
    }
}
