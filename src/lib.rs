// src/lib.rs

pub mod build;
pub mod cli;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod makefile;
pub mod types;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::build::{BuildReport, Scheduler};
use crate::cli::CliArgs;
use crate::dag::{DependencyGraph, build_order, find_cycle};
use crate::errors::Result;
use crate::exec::ShellRunner;
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - makefile discovery and parsing
/// - per-goal cycle rejection
/// - the threaded scheduler with the real filesystem and shell
pub fn run(args: &CliArgs) -> Result<BuildReport> {
    let root = args
        .directory
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let fs = RealFileSystem::rooted(&root);

    let graph = makefile::load(&fs, args.file.as_deref(), &args.targets)?;
    let goals = graph.goal_names();
    info!(?goals, targets = graph.len(), "makefile parsed");

    if args.dry_run {
        return Ok(print_dry_run(&graph, &goals));
    }

    let runner = match &args.directory {
        Some(dir) => ShellRunner::in_dir(dir),
        None => ShellRunner::new(),
    };

    let scheduler = Scheduler::new(&graph, &fs, &runner);
    scheduler.build(&goals, args.jobs as usize, print_cycle_failure)
}

/// Message printed for every goal dropped because of a dependency cycle.
pub fn print_cycle_failure(goal: &str) {
    println!("parmake: dropped goal '{goal}' due to circular dependencies");
}

/// Print the order in which rules would be considered, with their
/// dependencies and recipes, without running anything.
fn print_dry_run(graph: &DependencyGraph, goals: &[String]) -> BuildReport {
    let mut report = BuildReport::default();
    let mut accepted = Vec::new();

    for goal in goals {
        match graph.id_of(goal) {
            Some(id) if find_cycle(graph, id).is_none() => accepted.push(id),
            _ => {
                print_cycle_failure(goal);
                report.dropped_goals.push(goal.clone());
            }
        }
    }

    println!("parmake dry-run");
    println!("  goals: {:?}", goals);
    println!();

    let order = build_order(graph, &accepted);
    println!("rules ({}):", order.len());
    for id in order {
        let target = graph.target(id);
        println!("  - {}", target.name);
        let deps: Vec<&str> = graph
            .dependencies(id)
            .into_iter()
            .map(|d| graph.name(d))
            .collect();
        if !deps.is_empty() {
            println!("      deps: {:?}", deps);
        }
        for command in &target.commands {
            println!("      cmd: {command}");
        }
    }

    debug!("dry-run complete (no execution)");
    report
}
