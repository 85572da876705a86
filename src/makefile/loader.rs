// src/makefile/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dag::DependencyGraph;
use crate::errors::{ParmakeError, Result};
use crate::fs::FileSystem;
use crate::makefile::parser::parse;

/// Makefile names tried, in order, when none is given explicitly.
pub const DEFAULT_MAKEFILES: [&str; 2] = ["makefile", "Makefile"];

/// Pick the makefile to read.
///
/// An explicit path always wins. Otherwise the first of
/// [`DEFAULT_MAKEFILES`] that exists is used. If there is none the error
/// depends on whether goals were requested, the same way GNU make reports
/// it.
pub fn resolve_makefile(
    fs: &dyn FileSystem,
    explicit: Option<&Path>,
    goals: &[String],
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(name) = DEFAULT_MAKEFILES
        .iter()
        .find(|name| fs.exists(Path::new(name)))
    {
        return Ok(PathBuf::from(name));
    }

    match goals.first() {
        Some(goal) => Err(ParmakeError::UnknownTarget(goal.clone())),
        None => Err(ParmakeError::NoMakefile),
    }
}

/// Read the makefile at `path` and parse it into a dependency graph for
/// `goals`.
pub fn load_from_path(fs: &dyn FileSystem, path: &Path, goals: &[String]) -> Result<DependencyGraph> {
    let source = fs
        .read_to_string(path)
        .map_err(|err| ParmakeError::ReadMakefile {
            path: path.to_path_buf(),
            message: format!("{err:#}"),
        })?;

    let graph = parse(path, &source, goals)?;
    debug!(
        path = %path.display(),
        targets = graph.len(),
        goals = ?graph.goal_names(),
        "makefile loaded"
    );
    Ok(graph)
}

/// Resolve the makefile and load it. This is the entry point used by the
/// CLI.
pub fn load(fs: &dyn FileSystem, explicit: Option<&Path>, goals: &[String]) -> Result<DependencyGraph> {
    let path = resolve_makefile(fs, explicit, goals)?;
    load_from_path(fs, &path, goals)
}
