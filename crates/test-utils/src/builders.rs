#![allow(dead_code)]

use parmake::dag::DependencyGraph;

/// Builder for `DependencyGraph` to simplify test setup.
///
/// ```ignore
/// let graph = GraphBuilder::new()
///     .rule("a", &["b", "c"], &["echo a"])
///     .rule("b", &[], &["echo b"])
///     .goal("a")
///     .build();
/// ```
pub struct GraphBuilder {
    graph: DependencyGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: DependencyGraph::new(),
        }
    }

    /// Define `target` with its dependencies and recipe. Dependencies that
    /// have no rule of their own become command-less targets.
    pub fn rule(mut self, target: &str, deps: &[&str], commands: &[&str]) -> Self {
        let id = self.graph.add_target(target);
        for dep in deps {
            let dep = self.graph.add_target(dep);
            self.graph.add_dependency(id, dep);
        }
        self.graph
            .set_commands(id, commands.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Shorthand for a rule whose single command is `echo <target>`.
    pub fn echo_rule(self, target: &str, deps: &[&str]) -> Self {
        let command = format!("echo {target}");
        self.rule(target, deps, &[command.as_str()])
    }

    pub fn goal(mut self, target: &str) -> Self {
        let id = self.graph.add_target(target);
        self.graph.add_goal(id);
        self
    }

    pub fn build(self) -> DependencyGraph {
        self.graph
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
