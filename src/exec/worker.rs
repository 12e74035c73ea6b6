// src/exec/worker.rs

//! Per-task workers: the units of concurrent work during a run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task_entry::Claim;
use crate::errors::TaskFailure;
use crate::exec::gate::ConcurrencyGate;
use crate::TaskName;

/// Completion signal a worker reports to whoever dispatched it: `Ok` or
/// the failure recorded on the task (its own or an inherited one).
pub(crate) type Completion = std::result::Result<(), TaskFailure>;

/// State shared by every worker of one run: the immutable graph and the
/// permit gate.
pub(crate) struct RunContext {
    pub(crate) graph: TaskGraph,
    pub(crate) gate: ConcurrencyGate,
}

/// Spawn a worker for `name`, reporting its completion on `out`.
pub(crate) fn dispatch(ctx: Arc<RunContext>, name: TaskName, out: mpsc::Sender<Completion>) {
    tokio::spawn(run_task(ctx, name, out));
}

/// Drive one task to completion.
///
/// The entry mutex is taken for the whole handler: the first worker to
/// arrive claims the task and holds the lock until the outcome is
/// recorded, so every later arrival blocks on the lock and then reports
/// the recorded outcome. Dependencies execute in child workers while the
/// lock is held; lock acquisition therefore follows dependency edges, and
/// the validated graph is acyclic, so no lock cycle can form.
///
/// Boxed so a worker can dispatch more of itself for its dependencies.
fn run_task(
    ctx: Arc<RunContext>,
    name: TaskName,
    out: mpsc::Sender<Completion>,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async move {
        let entry = match ctx.graph.entry(&name) {
            Some(entry) => Arc::clone(entry),
            None => {
                // Validation runs before any dispatch, so every dispatched
                // name is registered.
                warn!(task = %name, "dispatched task missing from graph");
                let _ = out.send(Ok(())).await;
                return;
            }
        };

        let mut cell = entry.cell.lock().await;

        let body = match cell.claim() {
            Claim::Finished(outcome) => {
                drop(cell);
                debug!(task = %entry.name, "task already handled elsewhere");
                let _ = out.send(to_completion(outcome)).await;
                return;
            }
            Claim::Owned(body) => body,
        };

        debug!(task = %entry.name, deps = entry.deps.len(), "claimed task");

        // Run every dependency first. The body is skipped if any of them
        // fails; this task then carries that dependency's failure.
        if let Some(failure) = await_dependencies(&ctx, &entry.deps).await {
            debug!(task = %entry.name, "dependency failed; skipping body");
            cell.record(Some(failure.clone()));
            drop(cell);
            let _ = out.send(Err(failure)).await;
            return;
        }

        // The permit brackets only the body. Holding one while waiting on
        // dependencies would deadlock any graph deeper than the cap.
        let admission = ctx.gate.admit().await;
        debug!(task = %entry.name, "running task body");
        let result = body();
        drop(admission);

        let failure = result.err().map(TaskFailure::new);
        cell.record(failure.clone());
        drop(cell);

        match failure {
            Some(failure) => {
                warn!(task = %entry.name, error = %failure, "task failed");
                let _ = out.send(Err(failure)).await;
            }
            None => {
                debug!(task = %entry.name, "task finished");
                let _ = out.send(Ok(())).await;
            }
        }
    })
}

/// Dispatch every dependency as a child worker and drain their
/// completions. Returns the first failure observed, if any; dependencies
/// still in flight at that point run to completion on their own.
async fn await_dependencies(ctx: &Arc<RunContext>, deps: &[TaskName]) -> Option<TaskFailure> {
    if deps.is_empty() {
        return None;
    }

    let (tx, mut rx) = mpsc::channel(deps.len());
    for dep in deps {
        dispatch(Arc::clone(ctx), dep.clone(), tx.clone());
    }
    drop(tx);

    for _ in 0..deps.len() {
        match rx.recv().await {
            Some(Err(failure)) => return Some(failure),
            Some(Ok(())) => {}
            // All senders gone: every remaining dependency has reported.
            None => break,
        }
    }
    None
}

fn to_completion(outcome: Option<TaskFailure>) -> Completion {
    match outcome {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}
