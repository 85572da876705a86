// src/build/oracle.rs

//! Staleness decision for a single rule.
//!
//! File targets (an artifact with the target's name exists) are judged
//! purely by artifact existence and modification times. Phony targets with
//! dependencies are judged by the build state of those dependencies, read
//! under the graph's state lock. Only the phony branch can observe a failed
//! dependency; a file target whose dependency failed is still compared by
//! timestamp alone.

use std::fmt;
use std::path::Path;
use std::time::SystemTime;

use tracing::warn;

use crate::dag::{DependencyGraph, TargetId};
use crate::fs::FileSystem;
use crate::types::RuleState;

/// What a worker should do with a candidate rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A dependency failed (or an artifact could not be inspected); mark
    /// the rule failed without running it.
    Error,
    /// Some dependency is still pending; look again later.
    NotReady,
    /// Run the recipe now.
    Run,
    /// The artifact is up to date; mark the rule successful.
    SkipSatisfied,
    /// The rule already reached a terminal state.
    AlreadyDone,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Decision::Error => "error",
            Decision::NotReady => "not-ready",
            Decision::Run => "run",
            Decision::SkipSatisfied => "skip-satisfied",
            Decision::AlreadyDone => "already-done",
        };
        f.write_str(s)
    }
}

/// Decide what to do with `id`.
pub fn decide(graph: &DependencyGraph, fs: &dyn FileSystem, id: TargetId) -> Decision {
    if graph.state(id) != RuleState::Pending {
        return Decision::AlreadyDone;
    }

    let name = graph.name(id);
    let artifact = Path::new(name);
    let deps = graph.dependencies(id);

    if deps.is_empty() {
        return if fs.exists(artifact) {
            Decision::SkipSatisfied
        } else {
            Decision::Run
        };
    }

    if fs.exists(artifact) {
        return decide_file(graph, fs, name, &deps);
    }

    graph.with_states(|states| {
        let mut pending = false;
        for dep in &deps {
            match states[dep.index()] {
                RuleState::Failed => return Decision::Error,
                RuleState::Pending => pending = true,
                RuleState::Success => {}
            }
        }
        if pending {
            Decision::NotReady
        } else {
            Decision::Run
        }
    })
}

/// Timestamp comparison for a target whose artifact exists.
///
/// Short-circuits on the first dependency that forces a rebuild.
fn decide_file(
    graph: &DependencyGraph,
    fs: &dyn FileSystem,
    name: &str,
    deps: &[TargetId],
) -> Decision {
    let mut own: Option<SystemTime> = None;

    for &dep in deps {
        let dep_artifact = Path::new(graph.name(dep));
        if !fs.exists(dep_artifact) {
            return Decision::Run;
        }

        let target_time = match own {
            Some(t) => t,
            None => match fs.modified(Path::new(name)) {
                Ok(t) => *own.insert(t),
                Err(err) => {
                    warn!(rule = %name, error = %err, "cannot read artifact metadata");
                    return Decision::Error;
                }
            },
        };

        match fs.modified(dep_artifact) {
            Ok(dep_time) if dep_time >= target_time => return Decision::Run,
            Ok(_) => {}
            Err(err) => {
                warn!(
                    rule = %name,
                    dependency = %graph.name(dep),
                    error = %err,
                    "cannot read dependency metadata"
                );
                return Decision::Error;
            }
        }
    }

    Decision::SkipSatisfied
}
