// src/errors.rs

//! Crate-wide error taxonomy and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PairdagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Malformed result in {}, line {line}: {reason}", .artifact.display())]
    MalformedResult {
        artifact: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Completion check failed: {0}")]
    CompletionCheck(String),

    #[error(
        "Inconsistent result for pair ({a}, {b}): cell already holds {existing}, got {conflicting}"
    )]
    InconsistentResult {
        a: usize,
        b: usize,
        existing: f64,
        conflicting: f64,
    },

    #[error("Manifest error in {}: {reason}", .path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PairdagError {
    /// Process exit code for this error.
    ///
    /// Configuration-class failures (nothing was submitted or assembled) exit
    /// with 1; result-integrity failures (the jobs ran but the outputs are
    /// unusable) exit with 2. Success is 0, decided by `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            PairdagError::MalformedResult { .. }
            | PairdagError::CompletionCheck(_)
            | PairdagError::InconsistentResult { .. } => 2,
            _ => 1,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PairdagError>;
