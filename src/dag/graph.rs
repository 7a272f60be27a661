// src/dag/graph.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{PipesubmitError, Result};

/// Name-keyed dependency graph used to validate definitions before ids exist.
///
/// Edge direction: dependency -> dependent. For a job `B` with
/// `after = ["A"]` we add `A -> B`.
#[derive(Debug, Clone, Default)]
pub struct JobGraph<'a> {
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> JobGraph<'a> {
    pub fn new() -> Self {
        Self {
            graph: DiGraphMap::new(),
        }
    }

    pub fn add_job(&mut self, name: &'a str) {
        self.graph.add_node(name);
    }

    pub fn add_dependency(&mut self, dependency: &'a str, dependent: &'a str) {
        self.graph.add_edge(dependency, dependent, ());
    }

    /// Immediate dependencies of a job.
    pub fn dependencies_of(&self, name: &'a str) -> Vec<&'a str> {
        self.graph
            .neighbors_directed(name, petgraph::Direction::Incoming)
            .collect()
    }

    /// Topological order, or a `DagCycle` error naming one job on the cycle.
    pub fn topological_order(&self) -> Result<Vec<&'a str>> {
        toposort(&self.graph, None).map_err(|cycle| {
            PipesubmitError::DagCycle(format!(
                "cycle detected in job graph involving job '{}'",
                cycle.node_id()
            ))
        })
    }
}
