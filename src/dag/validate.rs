// src/dag/validate.rs

//! Pre-run validation of the dependency graph.

use tracing::debug;

use crate::dag::graph::TaskGraph;
use crate::dag::tarjan::strongly_connected_components;
use crate::errors::{Cycles, Result, TaskerError};
use crate::TaskName;

/// Check the graph before any body runs: every referenced dependency must
/// be registered, and the graph must contain no cycles.
pub(crate) fn validate(graph: &TaskGraph) -> Result<()> {
    check_dependencies_known(graph)?;
    check_acyclic(graph)?;
    debug!(tasks = graph.len(), "dependency graph validated");
    Ok(())
}

/// Report the first edge that points at an unregistered name. Which edge
/// that is when several are missing depends on map iteration order.
fn check_dependencies_known(graph: &TaskGraph) -> Result<()> {
    for name in graph.names() {
        for dep in graph.dependencies_of(name) {
            if !graph.contains(dep) {
                return Err(TaskerError::DependencyNotFound {
                    referrer: name.to_string(),
                    referent: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Self-loops are rejected at registration, so any cycle shows up as a
/// strongly connected component with more than one member.
fn check_acyclic(graph: &TaskGraph) -> Result<()> {
    let cycles: Vec<Vec<TaskName>> = strongly_connected_components(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .collect();

    if cycles.is_empty() {
        Ok(())
    } else {
        Err(TaskerError::Cycle(Cycles(cycles)))
    }
}
