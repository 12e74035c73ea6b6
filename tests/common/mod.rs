// tests/common/mod.rs

//! Shared helpers for exercising a [`Tasker`] in integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use tasker::Tasker;

/// Handle to one registered body's invocation count.
pub type Calls = Arc<AtomicUsize>;

/// Install a compact subscriber so a hanging or failing test can be
/// re-run with visible scheduler logs. Safe to call from several tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Register a succeeding task and return its invocation counter.
pub fn ok_task(tasker: &mut Tasker, name: &str, deps: &[&str]) -> Calls {
    tracked_task(tasker, name, deps, true)
}

/// Register a failing task and return its invocation counter.
pub fn failing_task(tasker: &mut Tasker, name: &str, deps: &[&str]) -> Calls {
    tracked_task(tasker, name, deps, false)
}

fn tracked_task(tasker: &mut Tasker, name: &str, deps: &[&str], succeed: bool) -> Calls {
    let calls = Arc::new(AtomicUsize::new(0));
    let body_calls = Arc::clone(&calls);
    let task_name = name.to_string();
    tasker
        .register(name, deps, move || {
            body_calls.fetch_add(1, Ordering::SeqCst);
            if succeed {
                Ok(())
            } else {
                Err(anyhow!("{task_name} blew up"))
            }
        })
        .unwrap();
    calls
}

pub fn called_once(calls: &Calls) -> bool {
    calls.load(Ordering::SeqCst) == 1
}

pub fn never_called(calls: &Calls) -> bool {
    calls.load(Ordering::SeqCst) == 0
}

/// Shared instrumentation measuring how many bodies run at the same time.
///
/// Bodies registered through the probe sleep briefly so that overlap is
/// observable; use a multi-threaded test runtime.
pub struct Probe {
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicUsize::new(0)),
            max_running: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Register a succeeding task whose execution window is measured.
    pub fn ok_task(&self, tasker: &mut Tasker, name: &str, deps: &[&str]) -> Calls {
        let calls = Arc::new(AtomicUsize::new(0));
        let body_calls = Arc::clone(&calls);
        let running = Arc::clone(&self.running);
        let max_running = Arc::clone(&self.max_running);
        tasker
            .register(name, deps, move || {
                body_calls.fetch_add(1, Ordering::SeqCst);
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                max_running.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        calls
    }

    /// Highest number of bodies observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only record of body start/finish events for ordering assertions.
#[derive(Clone)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    /// Register a succeeding task that logs `start <name>` and
    /// `end <name>`, and return its invocation counter.
    pub fn ok_task(&self, tasker: &mut Tasker, name: &str, deps: &[&str]) -> Calls {
        let calls = Arc::new(AtomicUsize::new(0));
        let body_calls = Arc::clone(&calls);
        let log = Arc::clone(&self.0);
        let task_name = name.to_string();
        tasker
            .register(name, deps, move || {
                body_calls.fetch_add(1, Ordering::SeqCst);
                log.lock().unwrap().push(format!("start {task_name}"));
                log.lock().unwrap().push(format!("end {task_name}"));
                Ok(())
            })
            .unwrap();
        calls
    }

    /// Index of the first occurrence of `event`, if it was recorded.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|e| e == event)
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
