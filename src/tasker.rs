// src/tasker.rs

//! The scheduler itself: registration and the single run.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::graph::TaskGraph;
use crate::dag::validate::validate;
use crate::errors::{Result, TaskerError};
use crate::exec::gate::ConcurrencyGate;
use crate::exec::worker::{dispatch, Completion, RunContext};
use crate::TaskName;

/// Upper bound on simultaneously executing task bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// At most this many bodies run at once. Must be at least 1.
    Bounded(usize),
    /// No limit beyond what the dependency graph imposes.
    Unbounded,
}

/// In-process task scheduler with dependency constraints and bounded
/// parallelism.
///
/// Tasks are registered under unique names together with the names of the
/// tasks that must succeed before they run. A single call to
/// [`Tasker::run`] (or [`Tasker::run_subset`]) then drives the graph:
/// each body runs at most once, a body only runs after all of its
/// dependencies succeeded, and a dependency failure is inherited by every
/// transitive dependent whose body has not started.
///
/// Instances are single-use: after a run has started, any further run
/// reports [`TaskerError::AlreadyRun`]. The registered graph itself is
/// never mutated by running, so a fresh instance can be built from the
/// same registrations to retry.
pub struct Tasker {
    graph: TaskGraph,
    gate: ConcurrencyGate,
    consumed: AtomicBool,
}

impl fmt::Debug for Tasker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tasker")
            .field("tasks", &self.graph.len())
            .field("consumed", &self.consumed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Tasker {
    /// Create a scheduler that runs at most `cap` bodies simultaneously.
    ///
    /// A bounded cap of zero could never run anything and is rejected with
    /// [`TaskerError::InvalidConcurrency`].
    pub fn new(cap: Concurrency) -> Result<Self> {
        let gate = match cap {
            Concurrency::Bounded(0) => {
                return Err(TaskerError::InvalidConcurrency { cap: 0 });
            }
            Concurrency::Bounded(n) => ConcurrencyGate::bounded(n),
            Concurrency::Unbounded => ConcurrencyGate::unbounded(),
        };
        Ok(Self {
            graph: TaskGraph::default(),
            gate,
            consumed: AtomicBool::new(false),
        })
    }

    /// Register a task under a unique, non-empty `name`.
    ///
    /// `deps` are the names of tasks that must complete successfully
    /// before this one runs. They do not have to be registered yet:
    /// unresolved names are diagnosed when the run starts, so tasks can be
    /// registered in any order. A name may appear more than once in
    /// `deps`; repeats have the same effect as a single occurrence.
    ///
    /// Registering after the instance has run is accepted but pointless:
    /// the new task can never execute because instances are single-use.
    pub fn register<F>(&mut self, name: &str, deps: &[&str], body: F) -> Result<()>
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        if name.is_empty() {
            return Err(TaskerError::EmptyTaskName);
        }
        if self.graph.contains(name) {
            return Err(TaskerError::DuplicateTask {
                name: name.to_string(),
            });
        }
        if deps.iter().any(|dep| *dep == name) {
            return Err(TaskerError::SelfDependency {
                name: name.to_string(),
            });
        }

        let deps: Vec<TaskName> = deps.iter().map(|d| d.to_string()).collect();
        debug!(task = %name, deps = ?deps, "registered task");
        self.graph.insert(name.to_string(), deps, Box::new(body));
        Ok(())
    }

    /// Names of all registered tasks, in no particular order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.graph.names()
    }

    /// Run every registered task. See [`Tasker::run_subset`] for the full
    /// contract.
    pub async fn run(&self) -> Result<()> {
        let roots: Vec<TaskName> = self.graph.names().map(|s| s.to_string()).collect();
        self.run_roots(roots).await
    }

    /// Run the named tasks and everything they transitively depend on.
    ///
    /// The names only pick the roots; dependency expansion still pulls in
    /// every transitively required task. An empty slice means "all
    /// registered tasks". Returns the first failure drained from the root
    /// completions, or `Ok(())` if every root succeeded. Which failure is
    /// first is nondeterministic when several roots fail at once.
    pub async fn run_subset(&self, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return self.run().await;
        }
        let roots: Vec<TaskName> = names.iter().map(|n| n.to_string()).collect();
        self.run_roots(roots).await
    }

    async fn run_roots(&self, roots: Vec<TaskName>) -> Result<()> {
        if self.consumed.load(Ordering::SeqCst) {
            return Err(TaskerError::AlreadyRun);
        }

        validate(&self.graph)?;

        for name in &roots {
            if !self.graph.contains(name) {
                return Err(TaskerError::UnknownTask { name: name.clone() });
            }
        }

        // Single-use gate. The swap settles callers racing past the check
        // above; only one of them proceeds to dispatch.
        if self.consumed.swap(true, Ordering::SeqCst) {
            return Err(TaskerError::AlreadyRun);
        }

        info!(roots = roots.len(), tasks = self.graph.len(), "starting run");

        let ctx = Arc::new(RunContext {
            graph: self.graph.clone(),
            gate: self.gate.clone(),
        });

        let (tx, mut rx) = mpsc::channel::<Completion>(roots.len().max(1));
        for name in &roots {
            dispatch(Arc::clone(&ctx), name.clone(), tx.clone());
        }
        drop(tx);

        // Every dispatched root reports exactly once. The first failure
        // drained wins, but the loop still waits for the rest so the run
        // only returns once every root has completed.
        let mut first_failure = None;
        for _ in 0..roots.len() {
            match rx.recv().await {
                Some(Err(failure)) if first_failure.is_none() => {
                    first_failure = Some(failure);
                }
                Some(_) => {}
                None => break,
            }
        }

        match first_failure {
            Some(failure) => {
                info!(error = %failure, "run finished with a failure");
                Err(TaskerError::TaskFailed(failure))
            }
            None => {
                info!("run finished");
                Ok(())
            }
        }
    }
}
