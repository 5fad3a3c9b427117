// src/collect/mod.rs

//! Result collection and matrix assembly.
//!
//! - [`results`] merges and parses the per-batch output artifacts, resolves
//!   item paths back to ordinals through the items manifest, and enforces the
//!   duplicate / completeness checks.
//! - [`matrix`] holds the dense distance matrix and its serialization.

pub mod matrix;
pub mod results;

pub use matrix::DistanceMatrix;
pub use results::{ResultSet, collect_from_dir, collect_from_file, merge_artifacts};
