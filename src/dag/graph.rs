// src/dag/graph.rs

use std::collections::HashMap;
use std::sync::Arc;

use crate::dag::task_entry::{TaskBody, TaskEntry};
use crate::TaskName;

/// In-memory store of registered tasks keyed by name.
///
/// Entries are reference-counted so that workers spawned during a run can
/// share them without borrowing from the scheduler. Cloning the graph
/// clones the map, not the entries; a clone observes the same per-task
/// state as the original.
#[derive(Default, Clone)]
pub(crate) struct TaskGraph {
    entries: HashMap<TaskName, Arc<TaskEntry>>,
}

impl TaskGraph {
    /// Insert a task entry. The caller has already checked uniqueness.
    pub(crate) fn insert(&mut self, name: TaskName, deps: Vec<TaskName>, body: TaskBody) {
        let entry = TaskEntry::new(name.clone(), deps, body);
        self.entries.insert(name, Arc::new(entry));
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&Arc<TaskEntry>> {
        self.entries.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// All registered task names, in no particular order.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a task.
    pub(crate) fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.entries
            .get(name)
            .map(|e| e.deps.as_slice())
            .unwrap_or(&[])
    }
}
