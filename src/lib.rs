// src/lib.rs

//! In-process task scheduler with dependency constraints and bounded
//! parallelism.
//!
//! Register named units of work, each declaring which other units must
//! complete successfully first, then run the whole graph once:
//!
//! ```
//! use tasker::{Concurrency, Tasker};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tasker::Result<()> {
//! let mut tasker = Tasker::new(Concurrency::Bounded(2))?;
//! tasker.register("fetch", &[], || Ok(()))?;
//! tasker.register("build", &["fetch"], || Ok(()))?;
//! tasker.register("test", &["build"], || Ok(()))?;
//! tasker.run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! The scheduler guarantees that:
//! - every body runs at most once, no matter how many tasks depend on it;
//! - a body only runs after all of its dependencies completed successfully;
//! - a failed dependency is inherited by every transitive dependent whose
//!   body has not started;
//! - at most `cap` bodies execute simultaneously when the cap is bounded.
//!
//! Unknown dependency references and cycles are rejected before any body
//! runs. Instances are single-use: a second run reports
//! [`TaskerError::AlreadyRun`].

pub mod errors;
pub mod tasker;

mod dag;
mod exec;

pub use errors::{Cycles, Result, TaskFailure, TaskerError};
pub use tasker::{Concurrency, Tasker};

/// Task names are plain strings; uniqueness is enforced at registration.
pub type TaskName = String;
