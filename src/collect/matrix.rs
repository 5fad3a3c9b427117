// src/collect/matrix.rs

//! The dense distance matrix and its serialization.
//!
//! Storage is upper-triangular: applying a result writes only cell
//! `(a, b)` with `a < b`; the diagonal and lower triangle stay zero unless
//! the caller asks for mirroring before serialization. Writes are
//! idempotent-or-error: re-writing a cell with the same value is fine,
//! re-writing it with a different value names the conflicting pair.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::collect::results::ResultSet;
use crate::errors::{PairdagError, Result};
use crate::pairs::Pair;
use crate::types::FloatFormat;

/// N×N distance matrix, row-major, zero-initialized.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    cells: Vec<f64>,
    written: Vec<bool>,
}

impl DistanceMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![0.0; n * n],
            written: vec![false; n * n],
        }
    }

    /// Build a matrix from a complete result set.
    pub fn from_results(results: &ResultSet) -> Result<Self> {
        let mut matrix = Self::new(results.item_count());
        for (pair, distance) in results.iter() {
            matrix.set(pair, distance)?;
        }
        Ok(matrix)
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.cells[i * self.n + j]
    }

    /// Write `distance` into cell `(pair.a, pair.b)`.
    pub fn set(&mut self, pair: Pair, distance: f64) -> Result<()> {
        debug_assert!(pair.b < self.n, "pair ordinal out of range");
        let idx = pair.a * self.n + pair.b;
        if self.written[idx] {
            let existing = self.cells[idx];
            if existing != distance {
                return Err(PairdagError::InconsistentResult {
                    a: pair.a,
                    b: pair.b,
                    existing,
                    conflicting: distance,
                });
            }
            return Ok(());
        }
        self.cells[idx] = distance;
        self.written[idx] = true;
        Ok(())
    }

    /// Copy every written upper-triangular cell `(i, j)` into `(j, i)`.
    pub fn mirror(&mut self) {
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                self.cells[j * self.n + i] = self.cells[i * self.n + j];
            }
        }
    }

    /// Serialize as comma-delimited text, one row per line, every cell
    /// rendered with the given precision and format.
    pub fn write_csv(&self, path: &Path, precision: usize, format: FloatFormat) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating matrix file {:?}", path))?;
        let mut writer = BufWriter::new(file);

        for i in 0..self.n {
            let row: Vec<String> = (0..self.n)
                .map(|j| format_cell(self.get(i, j), precision, format))
                .collect();
            writeln!(writer, "{}", row.join(","))?;
        }
        writer.flush()?;

        info!(
            path = %path.display(),
            size = self.n,
            %format,
            precision,
            "wrote distance matrix"
        );
        Ok(())
    }
}

fn format_cell(value: f64, precision: usize, format: FloatFormat) -> String {
    match format {
        FloatFormat::Fixed => format!("{value:.precision$}"),
        FloatFormat::Scientific => format!("{value:.precision$e}"),
    }
}
