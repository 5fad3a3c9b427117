// src/batch.rs

//! Partitioning of the pair-index range into schedulable batches, and the
//! batch manifest files that carry one batch's pair argument-tuples.
//!
//! A batch is a contiguous slice of the canonical pair-index sequence; each
//! one becomes a single node in the submission DAG. Batches never overlap
//! and never leave gaps: their union is exactly `[0, total_pairs)`.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::discover::ItemSet;
use crate::errors::{PairdagError, Result};
use crate::pairs::enumerate_from;

/// Manifest header prefix; the batch number follows it.
const BATCH_MANIFEST_HEADER: &str = "# pairdag-batch v1 batch ";

/// One contiguous slice of pair indices, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// Stable batch number, 0-based in slice order.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Batch {
    /// Number of pairs in this batch. Always >= 1.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the given pair index falls inside this batch.
    pub fn contains(&self, pair_index: usize) -> bool {
        pair_index >= self.start && pair_index < self.end
    }
}

/// Split `[0, total_pairs)` into `ceil(total_pairs / batch_size)` slices.
///
/// Batch `b` covers `[b * batch_size, min((b + 1) * batch_size, total))`.
/// When `total_pairs` is an exact multiple of `batch_size` there is no
/// trailing empty batch; `total_pairs == 0` yields zero batches.
pub fn partition(total_pairs: usize, batch_size: usize) -> Result<Vec<Batch>> {
    if batch_size == 0 {
        return Err(PairdagError::Config(
            "batch size (--numjobs) must be >= 1 (got 0)".to_string(),
        ));
    }

    let count = total_pairs.div_ceil(batch_size);
    let mut batches = Vec::with_capacity(count);

    for index in 0..count {
        let start = index * batch_size;
        let end = (start + batch_size).min(total_pairs);
        batches.push(Batch { index, start, end });
    }

    Ok(batches)
}

/// One row of a batch manifest.
///
/// `path_a`/`path_b` are the submit-side identity paths echoed into the
/// result records; `file_a`/`file_b` are the names the diagram files carry
/// inside the job sandbox (the scheduler transfers inputs flat, so these are
/// the basenames) and are what the collaborator is actually invoked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub pair_index: usize,
    pub path_a: PathBuf,
    pub path_b: PathBuf,
    pub file_a: PathBuf,
    pub file_b: PathBuf,
}

/// Write the manifest for one batch: header, then one
/// `<pair_index>\t<path_a>\t<path_b>\t<file_a>\t<file_b>` row per pair in
/// the slice.
pub fn write_manifest(batch: &Batch, items: &ItemSet, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating batch manifest {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}{}", BATCH_MANIFEST_HEADER, batch.index)?;

    let n = items.len();
    for (offset, pair) in enumerate_from(batch.start, n).take(batch.len()).enumerate() {
        let pair_index = batch.start + offset;
        // Items were discovered before batching; ordinals are always in range.
        let a = items.get(pair.a).expect("pair ordinal within item set");
        let b = items.get(pair.b).expect("pair ordinal within item set");
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            pair_index,
            a.path.display(),
            b.path.display(),
            sandbox_name(&a.path).display(),
            sandbox_name(&b.path).display()
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Name a transferred input carries inside the job sandbox.
pub fn sandbox_name(path: &Path) -> PathBuf {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf())
}

/// Read a batch manifest back, returning the batch number and its rows.
pub fn read_manifest(path: &Path) -> Result<(usize, Vec<ManifestEntry>)> {
    let manifest_err = |reason: String| PairdagError::Manifest {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path)
        .with_context(|| format!("opening batch manifest {:?}", path))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(manifest_err("empty manifest".to_string())),
    };
    let batch_index: usize = header
        .trim()
        .strip_prefix(BATCH_MANIFEST_HEADER)
        .and_then(|rest| rest.trim().parse().ok())
        .ok_or_else(|| {
            manifest_err(format!(
                "unrecognised header '{}' (expected '{}<N>')",
                header.trim(),
                BATCH_MANIFEST_HEADER
            ))
        })?;

    let mut entries = Vec::new();
    for (row, line_res) in lines.enumerate() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').collect();
        let [index, path_a, path_b, file_a, file_b] = fields.as_slice() else {
            return Err(manifest_err(format!(
                "row {} has {} fields (expected pair_index, path_a, path_b, file_a, file_b)",
                row,
                fields.len()
            )));
        };

        let pair_index: usize = index.parse().map_err(|_| {
            manifest_err(format!("row {} has non-numeric pair index '{}'", row, index))
        })?;

        entries.push(ManifestEntry {
            pair_index,
            path_a: PathBuf::from(*path_a),
            path_b: PathBuf::from(*path_b),
            file_a: PathBuf::from(*file_a),
            file_b: PathBuf::from(*file_b),
        });
    }

    Ok((batch_index, entries))
}
