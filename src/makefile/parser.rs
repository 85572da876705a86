// src/makefile/parser.rs

//! Makefile parsing.
//!
//! The accepted dialect is a small subset of GNU make: rule lines
//! `target: dep dep ...`, TAB-indented recipe lines, `#` comments and blank
//! lines. Variables, pattern rules and other make features are not
//! recognised.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::dag::{DependencyGraph, TargetId};
use crate::errors::{ParmakeError, Result};

/// Parse `source` (read from `path`) into a dependency graph whose root
/// target depends on `goals`.
///
/// With no goals the first target defined in the file becomes the only
/// goal. Syntax errors and unknown goals abort the whole parse.
pub fn parse(path: &Path, source: &str, goals: &[String]) -> Result<DependencyGraph> {
    let mut parser = Parser::new(path);
    for (idx, raw) in source.lines().enumerate() {
        parser.line(idx + 1, raw)?;
    }
    parser.finish(goals)
}

struct Parser<'p> {
    path: &'p Path,
    graph: DependencyGraph,
    first_target: Option<TargetId>,
    current: Option<TargetId>,
    in_recipe: bool,
    /// Line on which each rule's current recipe starts.
    recipe_start: HashMap<TargetId, usize>,
}

impl<'p> Parser<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            graph: DependencyGraph::new(),
            first_target: None,
            current: None,
            in_recipe: false,
            recipe_start: HashMap::new(),
        }
    }

    fn syntax(&self, line: usize, message: &str) -> ParmakeError {
        ParmakeError::Syntax {
            path: self.path.to_path_buf(),
            line,
            message: message.to_string(),
        }
    }

    fn line(&mut self, number: usize, raw: &str) -> Result<()> {
        let line = strip_comment(raw.trim()).trim_end();
        if line.is_empty() {
            return Ok(());
        }

        if raw.starts_with('\t') {
            self.recipe_line(number, line)
        } else if starts_like_target(line) {
            self.rule_line(number, line)
        } else {
            Err(self.syntax(number, "missing separator"))
        }
    }

    fn recipe_line(&mut self, number: usize, command: &str) -> Result<()> {
        let Some(current) = self.current else {
            return Err(self.syntax(number, "recipe commences before first target"));
        };

        if !self.in_recipe {
            if let Some(previous) = self.recipe_start.insert(current, number) {
                let rule = &self.graph.target(current).name;
                warn!(
                    path = %self.path.display(),
                    line = number,
                    previous,
                    rule = %rule,
                    "overriding recipe for target; ignoring old recipe"
                );
                self.graph.target_mut(current).commands.clear();
            }
        }

        self.in_recipe = true;
        self.graph
            .target_mut(current)
            .commands
            .push(command.to_string());
        Ok(())
    }

    fn rule_line(&mut self, number: usize, line: &str) -> Result<()> {
        self.in_recipe = false;
        self.current = None;

        let Some((head, deps)) = line.split_once(':') else {
            return Err(self.syntax(number, "missing separator"));
        };
        let name = head.split_whitespace().next().unwrap_or(head);

        let target = self.graph.add_target(name);
        self.first_target.get_or_insert(target);

        for dep in deps.split_whitespace() {
            let dep = self.graph.add_target(dep);
            self.graph.add_dependency(target, dep);
        }

        debug!(line = number, rule = %name, "parsed rule");
        self.current = Some(target);
        Ok(())
    }

    fn finish(mut self, goals: &[String]) -> Result<DependencyGraph> {
        let goals: Vec<String> = if goals.is_empty() {
            let first = self.first_target.ok_or(ParmakeError::NoTargets)?;
            vec![self.graph.name(first).to_string()]
        } else {
            goals.to_vec()
        };

        for goal in goals {
            match self.graph.id_of(&goal) {
                Some(id) if id != self.graph.root() => self.graph.add_goal(id),
                _ => return Err(ParmakeError::UnknownTarget(goal)),
            }
        }

        Ok(self.graph)
    }
}

/// Rule lines start with an alphanumeric character, `.` or `/`.
fn starts_like_target(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '/')
}

/// Cut `line` at the first `#` that is not inside double quotes.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut chars = line.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}
