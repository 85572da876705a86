// src/dag/cycle.rs

//! Per-goal cycle detection.
//!
//! Each check colours the targets reachable from one starting target as
//! unvisited, in progress or finished. The colouring is local to the call
//! and never touches the rules' build state. Reaching a target that is still
//! in progress means the walk followed a back edge, so the dependency
//! closure of the start contains a cycle.

use std::collections::HashMap;

use crate::dag::graph::{DependencyGraph, TargetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Finished,
}

/// One level of the explicit DFS stack.
struct Frame {
    target: TargetId,
    deps: Vec<TargetId>,
    next: usize,
}

impl Frame {
    fn enter(graph: &DependencyGraph, target: TargetId) -> Self {
        Self {
            target,
            deps: graph.dependencies(target),
            next: 0,
        }
    }
}

/// Whether the dependency closure of `start` contains a cycle.
pub fn has_cycle(graph: &DependencyGraph, start: TargetId) -> bool {
    find_cycle(graph, start).is_some()
}

/// Walk the closure of `start` and return the first cycle found, as the
/// chain of target names from the repeated target back to itself.
pub fn find_cycle(graph: &DependencyGraph, start: TargetId) -> Option<Vec<String>> {
    let mut marks: HashMap<TargetId, Mark> = HashMap::new();
    let mut stack = vec![Frame::enter(graph, start)];
    marks.insert(start, Mark::InProgress);

    while let Some(frame) = stack.last_mut() {
        let Some(child) = frame.deps.get(frame.next).copied() else {
            let done = frame.target;
            stack.pop();
            marks.insert(done, Mark::Finished);
            continue;
        };
        frame.next += 1;

        match marks.get(&child) {
            Some(Mark::Finished) => {}
            Some(Mark::InProgress) => {
                let from = stack
                    .iter()
                    .position(|f| f.target == child)
                    .unwrap_or(0);
                let mut path: Vec<String> = stack[from..]
                    .iter()
                    .map(|f| graph.name(f.target).to_string())
                    .collect();
                path.push(graph.name(child).to_string());
                return Some(path);
            }
            None => {
                marks.insert(child, Mark::InProgress);
                stack.push(Frame::enter(graph, child));
            }
        }
    }

    None
}
