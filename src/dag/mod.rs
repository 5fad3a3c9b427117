// src/dag/mod.rs

//! Submission DAG construction.
//!
//! - [`graph`] holds the in-memory node/edge set and writes the DAG
//!   description file consumed by the external scheduler.
//! - [`builder`] emits the full artifact set for one submission: batch
//!   manifests, per-batch submit files, the synthetic collect/matrix nodes
//!   and the DAG file itself.

pub mod builder;
pub mod graph;

pub use builder::{DagBuilder, SubmitOptions, Submission, resolve_executable};
pub use graph::{DagNode, JobDag};
