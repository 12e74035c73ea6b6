// src/dag/task_entry.rs

//! Per-task execution state.

use tokio::sync::Mutex;

use crate::errors::TaskFailure;
use crate::TaskName;

/// A task body: called at most once, with no arguments.
pub(crate) type TaskBody = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// A registered task: immutable metadata plus the mutex-guarded run state.
pub(crate) struct TaskEntry {
    pub(crate) name: TaskName,
    pub(crate) deps: Vec<TaskName>,
    pub(crate) cell: Mutex<TaskCell>,
}

impl TaskEntry {
    pub(crate) fn new(name: TaskName, deps: Vec<TaskName>, body: TaskBody) -> Self {
        Self {
            name,
            deps,
            cell: Mutex::new(TaskCell {
                body: Some(body),
                done: false,
                err: None,
            }),
        }
    }
}

/// Mutable task state, guarded by the entry's mutex.
///
/// The lifecycle is `unclaimed -> claimed -> outcome recorded`. The worker
/// that claims the task holds the mutex until the outcome is written, so
/// every other worker observes either "unclaimed" or a final outcome.
pub(crate) struct TaskCell {
    body: Option<TaskBody>,
    done: bool,
    err: Option<TaskFailure>,
}

/// What a worker finds when it locks a task's cell.
pub(crate) enum Claim {
    /// First arrival: the worker now owns the body and must record an
    /// outcome before releasing the mutex.
    Owned(TaskBody),
    /// The task was already claimed; this is its recorded outcome.
    Finished(Option<TaskFailure>),
}

impl TaskCell {
    /// Claim the task for the calling worker, or report the recorded
    /// outcome if another worker got here first.
    pub(crate) fn claim(&mut self) -> Claim {
        if self.done {
            return Claim::Finished(self.err.clone());
        }
        self.done = true;
        match self.body.take() {
            Some(body) => Claim::Owned(body),
            // The body is only taken here, guarded by `done`.
            None => Claim::Finished(self.err.clone()),
        }
    }

    /// Record the final outcome for this task (`None` means success).
    pub(crate) fn record(&mut self, err: Option<TaskFailure>) {
        self.err = err;
    }
}
