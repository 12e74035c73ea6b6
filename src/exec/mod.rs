// src/exec/mod.rs

//! Run-time execution: the permit gate and the per-task workers.

pub(crate) mod gate;
pub(crate) mod worker;
