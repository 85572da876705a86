// src/dag/order.rs

use std::collections::HashSet;

use crate::dag::graph::{DependencyGraph, TargetId};

/// Post-order walk over the union of the goals' dependency closures.
///
/// Every target appears once, after all of its dependencies. The result only
/// seeds the scheduler's candidate list; actual readiness is re-evaluated
/// while the build runs.
///
/// Callers must have rejected goals whose closure contains a cycle.
pub fn build_order(graph: &DependencyGraph, goals: &[TargetId]) -> Vec<TargetId> {
    let mut queued: HashSet<TargetId> = HashSet::new();
    let mut order = Vec::new();

    for &goal in goals {
        if !queued.insert(goal) {
            continue;
        }

        let mut stack = vec![(goal, graph.dependencies(goal), 0usize)];
        while let Some((target, deps, next)) = stack.last_mut() {
            match deps.get(*next).copied() {
                Some(dep) => {
                    *next += 1;
                    if queued.insert(dep) {
                        stack.push((dep, graph.dependencies(dep), 0));
                    }
                }
                None => {
                    order.push(*target);
                    stack.pop();
                }
            }
        }
    }

    order
}
