//! Concurrent per-frame processing and ordered fan-in.
//!
//! `run` drives a batch: one unit per image is spawned on a bounded pool (`process`), results
//! come back in completion order and are restored to input order with holes reported
//! (`aggregate`).

pub mod aggregate;
pub mod process;
pub mod run;
