#![cfg(unix)]

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use clap::Parser;
use parmake::cli::CliArgs;
use parmake::errors::ParmakeError;
use parmake::run;
use parmake::types::RuleState;
use parmake_test_utils::init_tracing;
use tempfile::TempDir;

fn project(makefile: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("Makefile"), makefile).expect("write makefile");
    dir
}

fn args(dir: &Path, extra: &[&str]) -> CliArgs {
    let dir = dir.to_string_lossy().into_owned();
    let mut argv = vec!["parmake", "-C", dir.as_str()];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("valid arguments")
}

fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).expect("open artifact");
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .expect("set mtime");
}

#[test]
fn builds_default_goal_in_directory() {
    init_tracing();
    let dir = project("all: b\n\ttouch a\n\nb:\n\ttouch b\n");

    let report = run(&args(dir.path(), &["-j", "2"])).unwrap();

    assert!(report.succeeded());
    assert_eq!(report.rules_run, 2);
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}

#[test]
fn existing_leaf_is_not_rebuilt() {
    let dir = project("all: b\n\techo all >> log\n\nb:\n\techo b >> log\n");
    fs::write(dir.path().join("b"), "").unwrap();

    let report = run(&args(dir.path(), &[])).unwrap();

    assert_eq!(report.rules_run, 1);
    let log = fs::read_to_string(dir.path().join("log")).unwrap();
    assert_eq!(log, "all\n");
}

#[test]
fn stale_file_target_follows_timestamps() {
    let dir = project("out: in\n\techo built >> out\n");
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::write(&input, "").unwrap();
    fs::write(&output, "").unwrap();
    set_mtime(&input, 1_000_000);
    set_mtime(&output, 2_000_000);

    let fresh = run(&args(dir.path(), &[])).unwrap();
    assert_eq!(fresh.rules_run, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");

    set_mtime(&input, 3_000_000);
    let stale = run(&args(dir.path(), &[])).unwrap();
    assert_eq!(stale.rules_run, 1);
    assert_eq!(fs::read_to_string(&output).unwrap(), "built\n");
}

#[test]
fn failing_recipe_fails_dependents() {
    let dir = project("x: y\n\ttouch x\n\ny:\n\texit 3\n\ttouch y\n");

    let report = run(&args(dir.path(), &["-j", "3"])).unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.state_of("x"), Some(RuleState::Failed));
    assert!(!dir.path().join("x").exists());
    assert!(!dir.path().join("y").exists());
}

#[test]
fn cyclic_goal_is_dropped() {
    let dir = project("a: b\nb: c\nc: a\n\nd:\n\ttouch d\n");

    let report = run(&args(dir.path(), &["a", "d"])).unwrap();

    assert_eq!(report.dropped_goals, vec!["a"]);
    assert_eq!(report.state_of("d"), Some(RuleState::Success));
    assert!(dir.path().join("d").exists());
    assert!(!report.succeeded());
}

#[test]
fn dry_run_executes_nothing() {
    let dir = project("all: b\n\ttouch a\n\nb:\n\ttouch b\n");

    let report = run(&args(dir.path(), &["--dry-run"])).unwrap();

    assert_eq!(report.rules_run, 0);
    assert!(!dir.path().join("a").exists());
    assert!(!dir.path().join("b").exists());
}

#[test]
fn explicit_makefile_and_unknown_goal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("build.mk"), "hello:\n\ttouch hello\n").unwrap();

    let report = run(&args(dir.path(), &["-f", "build.mk", "hello"])).unwrap();
    assert!(report.succeeded());
    assert!(dir.path().join("hello").exists());

    let err = run(&args(dir.path(), &["-f", "build.mk", "missing"])).unwrap_err();
    assert!(matches!(err, ParmakeError::UnknownTarget(ref t) if t == "missing"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn missing_makefile_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    let err = run(&args(dir.path(), &[])).unwrap_err();

    assert!(matches!(err, ParmakeError::NoMakefile));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn syntax_error_carries_location() {
    let dir = project("all: b\n\ttouch a\nthis line is broken\n");

    let err = run(&args(dir.path(), &[])).unwrap_err();

    match err {
        ParmakeError::Syntax { line, .. } => assert_eq!(line, 3),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}
