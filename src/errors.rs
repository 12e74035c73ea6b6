// src/errors.rs

//! Crate-wide error types.
//!
//! Everything the scheduler can report is a variant of [`TaskerError`], so
//! callers can discriminate outcomes by kind. Task bodies fail with plain
//! [`anyhow::Error`] values; a recorded failure is shared with every
//! dependent through [`TaskFailure`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::TaskName;

pub type Result<T> = std::result::Result<T, TaskerError>;

#[derive(Error, Debug)]
pub enum TaskerError {
    /// Scheduler constructed with a bounded concurrency cap of zero.
    #[error("tasker: concurrency cap must be positive, got {cap}")]
    InvalidConcurrency { cap: usize },

    /// A task was registered with an empty name.
    #[error("tasker: task name must not be empty")]
    EmptyTaskName,

    /// A task with this name is already registered.
    #[error("tasker: task already registered: {name}")]
    DuplicateTask { name: TaskName },

    /// A task listed itself among its own dependencies.
    #[error("tasker: task must not depend on itself: {name}")]
    SelfDependency { name: TaskName },

    /// A dependency list references a name that was never registered.
    #[error("tasker: {referent} not found, required by {referrer}")]
    DependencyNotFound {
        referrer: TaskName,
        referent: TaskName,
    },

    /// The dependency graph contains one or more cycles.
    #[error("{0}")]
    Cycle(Cycles),

    /// A requested subset root is not a registered task.
    #[error("tasker: unknown task: {name}")]
    UnknownTask { name: TaskName },

    /// The scheduler has already executed; instances are single-use.
    #[error("tasker: already run")]
    AlreadyRun,

    /// A task body returned an error, or a root inherited one from a
    /// failed dependency.
    #[error(transparent)]
    TaskFailed(#[from] TaskFailure),
}

/// The multi-vertex strongly connected components of the dependency graph.
///
/// Each inner list is one cycle, starting at the vertex that closed the
/// component during the search; the outer list is in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycles(pub Vec<Vec<TaskName>>);

impl fmt::Display for Cycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 1 {
            write!(f, "tasker: cycles detected: ")?;
        } else {
            write!(f, "tasker: cycle detected: ")?;
        }
        for (i, cycle) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cycle.join(" -> "))?;
        }
        Ok(())
    }
}

/// A failure recorded on a task.
///
/// The same value is observed by every dependent that inherits the
/// failure, so the underlying error is reference-counted rather than
/// cloned.
#[derive(Debug, Clone)]
pub struct TaskFailure(Arc<anyhow::Error>);

impl TaskFailure {
    pub(crate) fn new(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }

    /// The error the failing task body returned.
    pub fn error(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TaskFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &anyhow::Error = &self.0;
        Some(inner.as_ref())
    }
}
