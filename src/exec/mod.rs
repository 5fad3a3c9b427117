// src/exec/mod.rs

//! Process execution layer.
//!
//! This is the JobRunner wrapper that the scheduler actually runs inside a
//! batch proc: it spawns the external distance collaborator once per pair
//! (using `tokio::process::Command`) and relabels its output into
//! self-identifying result records. The distance computation itself never
//! lives in this crate.

pub mod runner;

pub use runner::run_batch;
