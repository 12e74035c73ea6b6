// src/exec/gate.rs

//! Permit pool bounding the number of concurrently executing bodies.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting-semaphore gate around task body execution.
///
/// The unbounded flavor hands out free admissions, so call sites never
/// special-case the configuration.
#[derive(Clone)]
pub(crate) struct ConcurrencyGate {
    semaphore: Option<Arc<Semaphore>>,
}

impl ConcurrencyGate {
    pub(crate) fn bounded(cap: usize) -> Self {
        Self {
            semaphore: Some(Arc::new(Semaphore::new(cap))),
        }
    }

    pub(crate) fn unbounded() -> Self {
        Self { semaphore: None }
    }

    /// Wait for an execution slot. The slot is returned when the
    /// [`Admission`] is dropped.
    pub(crate) async fn admit(&self) -> Admission {
        let permit = match &self.semaphore {
            // The semaphore is never closed, so acquisition cannot fail.
            Some(sem) => Arc::clone(sem).acquire_owned().await.ok(),
            None => None,
        };
        Admission { _permit: permit }
    }
}

/// Proof of admission through the gate; dropping it frees the slot.
pub(crate) struct Admission {
    _permit: Option<OwnedSemaphorePermit>,
}
