// src/discover.rs

//! Input item discovery and the items manifest.
//!
//! Discovery walks a directory tree, keeps files whose *name* matches one of
//! the configured glob patterns, and assigns each surviving path a zero-based
//! ordinal. The ordinal is the authoritative row/column index for the final
//! matrix, so assignment must be deterministic: paths are sorted before
//! ordinals are handed out, independent of readdir order.
//!
//! The manifest written at submit time (`<jobname>.items.tsv`) freezes the
//! ordinal-to-path mapping so that the later collect/matrix steps never
//! re-derive ordinals by re-walking the input directory. A blake3 digest over
//! the ordered path list is stored in the header and re-verified on read.

use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use tracing::{debug, info};

use crate::errors::{PairdagError, Result};

/// Manifest header line; bump the version when the row format changes.
const ITEMS_MANIFEST_HEADER: &str = "# pairdag-items v1";

/// One discovered diagram file.
#[derive(Debug, Clone)]
pub struct Item {
    /// Zero-based discovery-order index; doubles as the matrix row/column.
    pub ordinal: usize,
    /// Absolute path to the diagram file.
    pub path: PathBuf,
    /// Identifier extracted from the filename (trailing digits of the stem
    /// when present, otherwise the full stem). Informational only; routing
    /// always goes through the ordinal.
    pub id: String,
}

/// The full, ordered set of discovered items.
#[derive(Debug, Clone)]
pub struct ItemSet {
    items: Vec<Item>,
    by_path: HashMap<PathBuf, usize>,
}

impl ItemSet {
    /// Build an item set from an already-ordered, deduplicated path list.
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        let id_pattern = stem_digits_pattern();
        let items: Vec<Item> = paths
            .into_iter()
            .enumerate()
            .map(|(ordinal, path)| {
                let id = item_id(&path, &id_pattern);
                Item { ordinal, path, id }
            })
            .collect();

        let by_path = items
            .iter()
            .map(|item| (item.path.clone(), item.ordinal))
            .collect();

        Self { items, by_path }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, ordinal: usize) -> Option<&Item> {
        self.items.get(ordinal)
    }

    /// Ordinal of the item with this exact path, if any.
    pub fn ordinal_of(&self, path: &Path) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    /// blake3 digest over the ordered path list.
    ///
    /// This fingerprints *which* items exist and in *what order*, exactly
    /// the two things a matrix cell index depends on.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for item in &self.items {
            hasher.update(item.path.to_string_lossy().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Write the items manifest to `path`.
    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating manifest directory {:?}", parent))?;
        }

        let file = File::create(path)
            .with_context(|| format!("creating items manifest {:?}", path))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", ITEMS_MANIFEST_HEADER)?;
        writeln!(writer, "# digest {}", self.digest())?;
        for item in &self.items {
            writeln!(
                writer,
                "{}\t{}\t{}",
                item.ordinal,
                item.path.display(),
                item.id
            )?;
        }
        writer.flush()?;

        debug!(path = ?path, items = self.items.len(), "wrote items manifest");
        Ok(())
    }

    /// Read an items manifest back, verifying version and digest.
    pub fn read_manifest(path: &Path) -> Result<ItemSet> {
        let manifest_err = |reason: String| PairdagError::Manifest {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path)
            .with_context(|| format!("opening items manifest {:?}", path))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(manifest_err("empty manifest".to_string())),
        };
        if header.trim() != ITEMS_MANIFEST_HEADER {
            return Err(manifest_err(format!(
                "unrecognised header '{}' (expected '{}')",
                header.trim(),
                ITEMS_MANIFEST_HEADER
            )));
        }

        let digest_line = match lines.next() {
            Some(line) => line?,
            None => return Err(manifest_err("missing digest line".to_string())),
        };
        let declared_digest = digest_line
            .trim()
            .strip_prefix("# digest ")
            .ok_or_else(|| manifest_err("missing digest line".to_string()))?
            .to_string();

        let mut paths = Vec::new();
        for (row, line_res) in lines.enumerate() {
            let line = line_res?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut fields = trimmed.split('\t');
            let (ordinal, item_path) = match (fields.next(), fields.next()) {
                (Some(ord), Some(p)) => (ord, p),
                _ => {
                    return Err(manifest_err(format!(
                        "row {} does not have ordinal and path fields",
                        row
                    )));
                }
            };

            let ordinal: usize = ordinal.parse().map_err(|_| {
                manifest_err(format!("row {} has non-numeric ordinal '{}'", row, ordinal))
            })?;
            if ordinal != paths.len() {
                return Err(manifest_err(format!(
                    "row {} has ordinal {} (expected {}); manifest is reordered or truncated",
                    row,
                    ordinal,
                    paths.len()
                )));
            }

            paths.push(PathBuf::from(item_path));
        }

        let set = ItemSet::from_paths(paths);
        let computed = set.digest();
        if computed != declared_digest {
            return Err(manifest_err(format!(
                "digest mismatch (declared {}, computed {}); the item set changed since submit",
                declared_digest, computed
            )));
        }

        Ok(set)
    }
}

/// Discover diagram files under `dir`, filtered by file-name glob patterns.
///
/// Paths are made absolute, deduplicated, and sorted before ordinals are
/// assigned. `dir` must exist.
pub fn discover(dir: &Path, patterns: &[String]) -> Result<ItemSet> {
    if !dir.is_dir() {
        return Err(PairdagError::Config(format!(
            "directory does not exist: {}",
            dir.display()
        )));
    }

    let filter = build_name_filter(patterns)?;

    // Sorted + deduplicated as we go.
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        let entries = fs::read_dir(&current)
            .with_context(|| format!("reading directory {:?}", current))?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.is_file() {
                let name = match path.file_name() {
                    Some(name) => name.to_string_lossy().into_owned(),
                    None => continue,
                };
                if filter.is_match(&name) {
                    let abs = std::path::absolute(&path)
                        .with_context(|| format!("resolving absolute path for {:?}", path))?;
                    found.insert(abs);
                }
            }
        }
    }

    let set = ItemSet::from_paths(found.into_iter().collect());
    info!(
        dir = %dir.display(),
        items = set.len(),
        "discovered diagram files"
    );
    Ok(set)
}

/// Compile the file-name glob patterns into a single matcher.
fn build_name_filter(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|e| {
            PairdagError::Config(format!("invalid discover pattern '{}': {}", pat, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| PairdagError::Config(format!("building discover pattern set: {e}")))
}

fn stem_digits_pattern() -> Regex {
    // Trailing digits of the stem, e.g. "diagram0017" -> "0017".
    Regex::new(r"(\d+)$").expect("static pattern compiles")
}

/// Extract an informational id from the filename.
fn item_id(path: &Path, pattern: &Regex) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match pattern.captures(&stem) {
        // Strip leading zeros so "diagram0017" and "diagram17" agree.
        Some(caps) => {
            let digits = caps[1].trim_start_matches('0');
            if digits.is_empty() { "0".to_string() } else { digits.to_string() }
        }
        None => stem,
    }
}
