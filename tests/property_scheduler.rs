use std::collections::{BTreeSet, HashMap, HashSet};

use parmake::build::Scheduler;
use parmake::dag::{DependencyGraph, has_cycle};
use parmake::fs::mock::MockFileSystem;
use parmake::types::RuleState;
use parmake_test_utils::fake_runner::RecordingRunner;
use petgraph::algo::tarjan_scc;
use petgraph::visit::Dfs;
use proptest::prelude::*;

fn task(i: usize) -> String {
    format!("task_{i}")
}

// Acyclic by construction: task i may only depend on tasks 0..i.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<BTreeSet<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    if i == 0 {
                        BTreeSet::new()
                    } else {
                        picks.into_iter().map(|p| p % i).collect()
                    }
                })
                .collect()
        })
    })
}

fn graph_from(deps: &[BTreeSet<usize>], goals: &[usize]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    let ids: Vec<_> = (0..deps.len()).map(|i| graph.add_target(&task(i))).collect();
    for (i, ds) in deps.iter().enumerate() {
        for &d in ds {
            graph.add_dependency(ids[i], ids[d]);
        }
        graph.set_commands(ids[i], vec![format!("run {}", task(i))]);
    }
    for &g in goals {
        graph.add_goal(ids[g]);
    }
    graph
}

/// Which tasks should run and which should end successful, given that every
/// task is phony (no artifacts) and `failing` tasks exit non-zero.
fn expected(deps: &[BTreeSet<usize>], failing: &HashSet<usize>) -> (Vec<bool>, Vec<bool>) {
    let mut runs = vec![false; deps.len()];
    let mut ok = vec![false; deps.len()];
    for i in 0..deps.len() {
        runs[i] = deps[i].iter().all(|&d| ok[d]);
        ok[i] = runs[i] && !failing.contains(&i);
    }
    (runs, ok)
}

fn closure(deps: &[BTreeSet<usize>], goals: &[usize]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack: Vec<usize> = goals.to_vec();
    while let Some(i) = stack.pop() {
        if seen.insert(i) {
            stack.extend(deps[i].iter().copied());
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn scheduler_respects_dependencies(
        deps in dag_strategy(10),
        goal_picks in proptest::collection::vec(any::<usize>(), 1..4),
        failing_picks in proptest::collection::vec(any::<usize>(), 0..4),
        workers in 1usize..=4,
    ) {
        let n = deps.len();
        let goals: Vec<usize> = goal_picks.iter().map(|g| g % n).collect();
        let failing: HashSet<usize> = failing_picks.iter().map(|f| f % n).collect();

        let graph = graph_from(&deps, &goals);
        let fs = MockFileSystem::new();
        let mut runner = RecordingRunner::new();
        for &f in &failing {
            runner = runner.failing(&format!("run {}", task(f)));
        }

        let report = Scheduler::new(&graph, &fs, &runner)
            .build(&graph.goal_names(), workers, |_| {})
            .unwrap();
        prop_assert!(report.dropped_goals.is_empty());

        let (runs, ok) = expected(&deps, &failing);
        let reachable = closure(&deps, &goals);
        let order = runner.targets();
        let started: HashMap<&str, usize> =
            order.iter().enumerate().map(|(pos, t)| (t.as_str(), pos)).collect();

        for i in 0..n {
            let name = task(i);
            let state = graph.state_of(&name).unwrap();

            if !reachable.contains(&i) {
                prop_assert_eq!(runner.runs_of(&name), 0);
                prop_assert_eq!(state, RuleState::Pending);
                continue;
            }

            prop_assert_eq!(runner.runs_of(&name), usize::from(runs[i]), "runs of {}", name);
            let want = if ok[i] { RuleState::Success } else { RuleState::Failed };
            prop_assert_eq!(state, want, "state of {}", name);

            if let Some(&pos) = started.get(name.as_str()) {
                for &d in &deps[i] {
                    let dep_pos = started.get(task(d).as_str()).copied();
                    prop_assert!(dep_pos.is_some_and(|p| p < pos),
                        "{} started before its dependency {}", name, task(d));
                }
            }
        }

        prop_assert_eq!(report.rules_run, runs.iter().enumerate()
            .filter(|&(i, &r)| r && reachable.contains(&i))
            .count());
    }

    #[test]
    fn cycle_detection_matches_strong_components(
        n in 1usize..8,
        edges in proptest::collection::vec((0usize..8, 0usize..8), 0..16),
    ) {
        let mut graph = DependencyGraph::new();
        let ids: Vec<_> = (0..n).map(|i| graph.add_target(&task(i))).collect();
        for &(a, b) in &edges {
            graph.add_dependency(ids[a % n], ids[b % n]);
        }

        let pg = graph.as_petgraph();
        let sccs = tarjan_scc(pg);

        for &start in &ids {
            let mut reachable = HashSet::new();
            let mut dfs = Dfs::new(pg, start);
            while let Some(node) = dfs.next(pg) {
                reachable.insert(node);
            }

            let cyclic = sccs.iter().any(|scc| {
                reachable.contains(&scc[0])
                    && (scc.len() > 1 || pg.contains_edge(scc[0], scc[0]))
            });

            prop_assert_eq!(has_cycle(&graph, start), cyclic, "start {}", graph.name(start));
        }
    }
}
