// src/collect/results.rs

//! Parsing and reconciliation of per-pair results.
//!
//! Every result line is `path_a \t path_b \t distance`: identity lives in the
//! record itself, so artifacts may be discovered in any order and nothing is
//! recovered from file names. Paths map to ordinals only through the items
//! manifest written at submit time.
//!
//! Partial batch failures are the dominant real-world failure mode here, so
//! the completeness check is not optional: a missing pair is an error that
//! names the pair, never a silent zero in the matrix.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::discover::ItemSet;
use crate::errors::{PairdagError, Result};
use crate::pairs::{Pair, index_of, pair_at, pair_count};

/// How many missing pairs a completeness failure spells out before
/// truncating to a total count.
const MISSING_REPORT_CAP: usize = 20;

/// All collected results for one item set, keyed by canonical pair index.
#[derive(Debug)]
pub struct ResultSet {
    n: usize,
    distances: BTreeMap<usize, f64>,
}

impl ResultSet {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            distances: BTreeMap::new(),
        }
    }

    /// Number of items the pairs range over.
    pub fn item_count(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Record one result.
    ///
    /// A repeat of an already-recorded pair with the identical distance is
    /// tolerated (retried jobs legitimately produce it) and logged; a repeat
    /// with a different distance is an error naming the pair.
    pub fn insert(&mut self, pair: Pair, distance: f64) -> Result<()> {
        let index = index_of(pair, self.n);
        match self.distances.get(&index) {
            None => {
                self.distances.insert(index, distance);
                Ok(())
            }
            Some(&existing) if existing == distance => {
                warn!(
                    a = pair.a,
                    b = pair.b,
                    distance,
                    "duplicate result for pair (identical value, keeping it)"
                );
                Ok(())
            }
            Some(&existing) => Err(PairdagError::InconsistentResult {
                a: pair.a,
                b: pair.b,
                existing,
                conflicting: distance,
            }),
        }
    }

    /// Verify every expected pair has a result.
    pub fn check_complete(&self) -> Result<()> {
        let expected = pair_count(self.n);
        if self.distances.len() == expected {
            return Ok(());
        }

        let missing: Vec<usize> = (0..expected)
            .filter(|k| !self.distances.contains_key(k))
            .collect();

        let mut listed: Vec<String> = missing
            .iter()
            .take(MISSING_REPORT_CAP)
            .map(|&k| {
                let p = pair_at(k, self.n);
                format!("{} (pair {},{})", k, p.a, p.b)
            })
            .collect();
        if missing.len() > MISSING_REPORT_CAP {
            listed.push(format!("... {} missing in total", missing.len()));
        }

        Err(PairdagError::CompletionCheck(format!(
            "{} of {} pair results missing; pair indices: {}",
            missing.len(),
            expected,
            listed.join(", ")
        )))
    }

    /// Iterate results as `(pair, distance)` in pair-index order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, f64)> + '_ {
        self.distances
            .iter()
            .map(|(&k, &d)| (pair_at(k, self.n), d))
    }
}

/// Collect results from one combined TSV stream.
pub fn collect_from_file(path: &Path, items: &ItemSet) -> Result<ResultSet> {
    let mut set = ResultSet::new(items.len());
    consume_artifact(path, items, &mut set)?;
    set.check_complete()?;
    Ok(set)
}

/// Collect results from a directory of per-batch `.out` artifacts.
///
/// Artifact discovery order is irrelevant; the paths are sorted anyway so
/// log output is reproducible.
pub fn collect_from_dir(dir: &Path, items: &ItemSet) -> Result<ResultSet> {
    let mut set = ResultSet::new(items.len());
    for artifact in find_out_artifacts(dir)? {
        consume_artifact(&artifact, items, &mut set)?;
    }
    set.check_complete()?;
    Ok(set)
}

/// Merge every batch `.out` artifact under `dir` into one combined TSV.
///
/// This is the cleanup/aggregation node's work: lines are validated
/// syntactically (two non-empty paths, one finite non-negative distance) so
/// a garbled batch fails here, naming its artifact, rather than at matrix
/// time. Path-to-ordinal resolution happens later, against the manifest.
pub fn merge_artifacts(dir: &Path, outfile: &Path) -> Result<usize> {
    let artifacts = find_out_artifacts(dir)?;

    let out = File::create(outfile)
        .with_context(|| format!("creating merged results file {:?}", outfile))?;
    let mut writer = BufWriter::new(out);
    let mut total = 0usize;

    for artifact in &artifacts {
        let file = File::open(artifact)
            .with_context(|| format!("opening result artifact {:?}", artifact))?;
        for (row, line_res) in BufReader::new(file).lines().enumerate() {
            let line = line_res?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            // Validate only; the merged stream keeps the original fields.
            parse_result_line(trimmed, artifact, row + 1)?;
            writeln!(writer, "{}", trimmed)?;
            total += 1;
        }
        debug!(artifact = %artifact.display(), "merged result artifact");
    }
    writer.flush()?;

    info!(
        artifacts = artifacts.len(),
        results = total,
        outfile = %outfile.display(),
        "merged batch outputs"
    );
    Ok(total)
}

fn consume_artifact(path: &Path, items: &ItemSet, set: &mut ResultSet) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("opening result artifact {:?}", path))?;

    for (row, line_res) in BufReader::new(file).lines().enumerate() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let line_no = row + 1;
        let (path_a, path_b, distance) = parse_result_line(trimmed, path, line_no)?;

        let malformed = |reason: String| PairdagError::MalformedResult {
            artifact: path.to_path_buf(),
            line: line_no,
            reason,
        };

        let a = items
            .ordinal_of(Path::new(path_a))
            .ok_or_else(|| malformed(format!("unknown item path '{}'", path_a)))?;
        let b = items
            .ordinal_of(Path::new(path_b))
            .ok_or_else(|| malformed(format!("unknown item path '{}'", path_b)))?;
        if a == b {
            return Err(malformed(format!(
                "both fields name the same item '{}'",
                path_a
            )));
        }

        set.insert(Pair::new(a, b), distance)?;
    }

    Ok(())
}

/// Split one result line into its two path fields and a validated distance.
fn parse_result_line<'l>(
    line: &'l str,
    artifact: &Path,
    line_no: usize,
) -> Result<(&'l str, &'l str, f64)> {
    let malformed = |reason: String| PairdagError::MalformedResult {
        artifact: artifact.to_path_buf(),
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    let [path_a, path_b, distance] = fields.as_slice() else {
        return Err(malformed(format!(
            "{} tab-separated fields (expected path_a, path_b, distance)",
            fields.len()
        )));
    };

    if path_a.is_empty() || path_b.is_empty() {
        return Err(malformed("empty path field".to_string()));
    }

    let distance: f64 = distance
        .parse()
        .map_err(|_| malformed(format!("non-numeric distance '{}'", distance)))?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(malformed(format!(
            "distance must be finite and non-negative (got {})",
            distance
        )));
    }

    Ok((*path_a, *path_b, distance))
}

/// Find every batch output artifact under `dir`, sorted for reproducible
/// logs.
///
/// Only `*.batch.*.out` names qualify. The collect and matrix nodes declare
/// their own stdout into the same directory, so a blanket `*.out` filter
/// would feed a retried collect run its previous attempt's summary line.
fn find_out_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PairdagError::Config(format!(
            "directory does not exist: {}",
            dir.display()
        )));
    }

    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = fs::read_dir(&current)
            .with_context(|| format!("reading directory {:?}", current))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_batch_artifact(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn is_batch_artifact(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".out") && name.contains(".batch."))
}
