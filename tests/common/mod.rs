#![allow(dead_code)] // each test binary uses a different subset of helpers

use std::fs;
use std::path::PathBuf;
use std::sync::Once;

use tempfile::TempDir;
use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Create a directory of `n` fake diagram files (`diagram<i>.txt`, two
/// numeric columns each) and return it with the sorted file paths.
///
/// Names are zero-padded so lexicographic order matches numeric order and
/// ordinal `i` always belongs to `diagram_00i`.
pub fn diagram_dir(n: usize) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let mut paths = Vec::with_capacity(n);
    for i in 0..n {
        let path = dir.path().join(format!("diagram{i:03}.txt"));
        fs::write(&path, "0.1 0.9\n0.2 0.5\n").unwrap();
        paths.push(std::path::absolute(&path).unwrap());
    }
    paths.sort();
    (dir, paths)
}

/// Synthetic distance for pair `(i, j)`, distinct per pair.
pub fn synthetic_distance(i: usize, j: usize) -> f64 {
    (i * 100 + j) as f64 + 0.5
}

/// Write a results TSV covering every pair of `paths`, with distances from
/// [`synthetic_distance`], and return its path.
pub fn write_full_results(dir: &std::path::Path, paths: &[PathBuf]) -> PathBuf {
    write_results_excluding(dir, paths, None)
}

/// Like [`write_full_results`] but optionally omitting one pair `(i, j)`.
pub fn write_results_excluding(
    dir: &std::path::Path,
    paths: &[PathBuf],
    skip: Option<(usize, usize)>,
) -> PathBuf {
    let out = dir.join("results.tsv");
    let mut lines = String::new();
    for i in 0..paths.len() {
        for j in (i + 1)..paths.len() {
            if skip == Some((i, j)) {
                continue;
            }
            lines.push_str(&format!(
                "{}\t{}\t{}\n",
                paths[i].display(),
                paths[j].display(),
                synthetic_distance(i, j)
            ));
        }
    }
    fs::write(&out, lines).unwrap();
    out
}

/// Write an executable shell script into `dir` and return its path.
#[cfg(unix)]
pub fn fake_collaborator(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
