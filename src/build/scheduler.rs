// src/build/scheduler.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, error, info, trace, warn};

use crate::build::oracle::{self, Decision};
use crate::build::report::{BuildReport, GoalOutcome};
use crate::dag::{DependencyGraph, TargetId, build_order, find_cycle};
use crate::errors::{ParmakeError, Result};
use crate::exec::CommandRunner;
use crate::fs::FileSystem;
use crate::types::{CommandOutcome, RuleState};

/// Shared scheduling state of one build invocation.
///
/// The candidate list holds the rules still awaiting a decision. It only
/// shrinks. `changed` is paired with the candidate lock and broadcast after
/// every rule state transition.
///
/// Lock order is candidates, then the graph's state lock. A worker that
/// changes a rule's state releases the state lock before taking the
/// candidate lock to broadcast, so a worker that scanned the list under
/// that lock either sees the new state or is already waiting.
#[derive(Debug)]
struct BuildContext {
    candidates: Mutex<Vec<TargetId>>,
    changed: Condvar,
    rules_run: AtomicUsize,
}

impl BuildContext {
    fn new(seed: Vec<TargetId>) -> Self {
        Self {
            candidates: Mutex::new(seed),
            changed: Condvar::new(),
            rules_run: AtomicUsize::new(0),
        }
    }

    fn lock_candidates(&self) -> MutexGuard<'_, Vec<TargetId>> {
        self.candidates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Vec<TargetId>>) -> MutexGuard<'a, Vec<TargetId>> {
        self.changed.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    fn wake_all(&self) {
        let _guard = self.lock_candidates();
        self.changed.notify_all();
    }
}

/// Runs the rules reachable from a set of goals on a pool of worker
/// threads.
///
/// Each worker repeatedly scans the candidate list, asks the staleness
/// oracle about each entry and acts on the first one that is not blocked on
/// an unfinished dependency. When nothing is actionable it sleeps until
/// another worker finishes a rule. Workers exit once the list is empty.
pub struct Scheduler<'a> {
    graph: &'a DependencyGraph,
    fs: &'a dyn FileSystem,
    runner: &'a dyn CommandRunner,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        graph: &'a DependencyGraph,
        fs: &'a dyn FileSystem,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self { graph, fs, runner }
    }

    /// Build `goals` with `workers` threads.
    ///
    /// Goals whose dependency closure contains a cycle are dropped and
    /// passed to `on_dropped`; the remaining goals are built normally. An
    /// unknown goal aborts before anything runs. With zero workers nothing
    /// happens and an empty report is returned.
    pub fn build<F>(&self, goals: &[String], workers: usize, mut on_dropped: F) -> Result<BuildReport>
    where
        F: FnMut(&str),
    {
        let mut report = BuildReport::default();
        if workers == 0 {
            info!("no worker threads requested; nothing to build");
            return Ok(report);
        }

        let mut requested = Vec::with_capacity(goals.len());
        for goal in goals {
            let id = self
                .graph
                .id_of(goal)
                .filter(|&id| id != self.graph.root())
                .ok_or_else(|| ParmakeError::UnknownTarget(goal.clone()))?;
            requested.push((goal, id));
        }

        let mut scheduled: Vec<TargetId> = Vec::new();
        for (goal, id) in requested {
            if let Some(cycle) = find_cycle(self.graph, id) {
                warn!(
                    goal = %goal,
                    cycle = %cycle.join(" -> "),
                    "dropping goal with circular dependencies"
                );
                on_dropped(goal);
                report.dropped_goals.push(goal.clone());
            } else if !scheduled.contains(&id) {
                scheduled.push(id);
            }
        }

        let order = build_order(self.graph, &scheduled);
        info!(
            goals = scheduled.len(),
            candidates = order.len(),
            workers,
            "starting build"
        );

        let ctx = BuildContext::new(order);
        thread::scope(|scope| -> Result<()> {
            for worker in 0..workers {
                let ctx = &ctx;
                thread::Builder::new()
                    .name(format!("parmake-worker-{worker}"))
                    .spawn_scoped(scope, move || self.worker_loop(worker, ctx))?;
            }
            Ok(())
        })?;

        report.rules_run = ctx.rules_run.load(Ordering::Relaxed);
        report.goals = scheduled
            .iter()
            .map(|&id| GoalOutcome {
                name: self.graph.name(id).to_string(),
                state: self.graph.state(id),
            })
            .collect();

        info!(
            rules_run = report.rules_run,
            succeeded = report.succeeded(),
            "build finished"
        );
        Ok(report)
    }

    fn worker_loop(&self, worker: usize, ctx: &BuildContext) {
        debug!(worker, "worker started");
        let mut candidates = ctx.lock_candidates();

        loop {
            if candidates.is_empty() {
                debug!(worker, "candidate list drained; worker exiting");
                return;
            }

            let found = candidates.iter().enumerate().find_map(|(pos, &id)| {
                match oracle::decide(self.graph, self.fs, id) {
                    Decision::NotReady => None,
                    decision => Some((pos, id, decision)),
                }
            });

            let Some((pos, id, decision)) = found else {
                trace!(worker, waiting = candidates.len(), "no rule ready; waiting");
                candidates = ctx.wait(candidates);
                continue;
            };

            candidates.remove(pos);
            let drained = candidates.is_empty();
            drop(candidates);

            let target = self.graph.name(id);
            debug!(worker, rule = %target, %decision, "rule decided");

            match decision {
                Decision::Run => {
                    ctx.rules_run.fetch_add(1, Ordering::Relaxed);
                    let state = self.execute(worker, id);
                    self.finish(ctx, id, state);
                }
                Decision::Error => self.finish(ctx, id, RuleState::Failed),
                Decision::SkipSatisfied => self.finish(ctx, id, RuleState::Success),
                Decision::AlreadyDone => {
                    if drained {
                        ctx.wake_all();
                    }
                }
                // Filtered out by the scan above.
                Decision::NotReady => {}
            }

            candidates = ctx.lock_candidates();
        }
    }

    /// Run the recipe of `id`, stopping at the first failing command.
    fn execute(&self, worker: usize, id: TargetId) -> RuleState {
        let target = self.graph.target(id);

        for command in &target.commands {
            match self.runner.run(&target.name, command) {
                Ok(CommandOutcome::Success) => {}
                Ok(CommandOutcome::Failed(code)) => {
                    warn!(
                        worker,
                        rule = %target.name,
                        command = %command,
                        exit_code = code,
                        "command failed; rule failed"
                    );
                    return RuleState::Failed;
                }
                Err(err) => {
                    error!(
                        worker,
                        rule = %target.name,
                        command = %command,
                        error = %err,
                        "could not run command; rule failed"
                    );
                    return RuleState::Failed;
                }
            }
        }

        RuleState::Success
    }

    fn finish(&self, ctx: &BuildContext, id: TargetId, state: RuleState) {
        if self.graph.transition(id, state) {
            debug!(rule = %self.graph.name(id), %state, "rule finished");
        }
        ctx.wake_all();
    }
}
