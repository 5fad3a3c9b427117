// src/exec/runner.rs

//! The batch worker: run every pair of one batch manifest through the
//! distance collaborator, serially, and emit one result record per pair.
//!
//! The collaborator contract is fixed: invoked with two diagram file paths,
//! it prints a single line `<label> <numeric-distance>` and exits 0. A
//! non-zero exit or malformed stdout is a hard failure for the whole batch;
//! the scheduler's retry policy decides what happens next, not this process.
//!
//! The worker runs inside the job sandbox, where the scheduler has placed
//! the transferred inputs flat under their basenames. The collaborator is
//! therefore invoked with the manifest's sandbox file columns, while the
//! emitted records carry the submit-side identity paths: each record is
//! `path_a \t path_b \t distance`, so the collector never has to care which
//! proc produced it or in what order the artifacts land on disk.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

use crate::batch::{self, ManifestEntry};

/// Run every pair in the batch manifest, writing result records to `out`.
///
/// Returns the number of pairs computed.
pub async fn run_batch(manifest: &Path, exe: &Path, out: &mut impl Write) -> Result<usize> {
    let (batch_index, entries) =
        batch::read_manifest(manifest).map_err(anyhow::Error::new)?;

    info!(
        batch = batch_index,
        pairs = entries.len(),
        exe = %exe.display(),
        "running batch"
    );

    for entry in &entries {
        let distance = run_pair(exe, entry).await?;
        writeln!(
            out,
            "{}\t{}\t{}",
            entry.path_a.display(),
            entry.path_b.display(),
            distance
        )
        .context("writing result record")?;
    }
    out.flush().context("flushing result records")?;

    Ok(entries.len())
}

/// Invoke the collaborator for one pair and parse its single output line.
async fn run_pair(exe: &Path, entry: &ManifestEntry) -> Result<f64> {
    debug!(
        pair = entry.pair_index,
        a = %entry.path_a.display(),
        b = %entry.path_b.display(),
        "computing pair distance"
    );

    let output = Command::new(exe)
        .arg(&entry.file_a)
        .arg(&entry.file_b)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("spawning {:?} for pair {}", exe, entry.pair_index))?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "distance executable failed for pair {} ({} vs {}): exit code {}, stderr: {}",
            entry.pair_index,
            entry.path_a.display(),
            entry.path_b.display(),
            code,
            stderr.trim()
        );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_collaborator_line(stdout.trim()).with_context(|| {
        format!(
            "unexpected output from {:?} for pair {}",
            exe, entry.pair_index
        )
    })
}

/// Parse the collaborator's `<label> <numeric-distance>` line.
fn parse_collaborator_line(line: &str) -> Result<f64> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [_label, distance] = fields.as_slice() else {
        bail!("expected '<label> <distance>', got '{}'", line);
    };

    let distance: f64 = distance
        .parse()
        .with_context(|| format!("non-numeric distance '{}'", distance))?;
    if !distance.is_finite() || distance < 0.0 {
        bail!("distance must be finite and non-negative (got {})", distance);
    }

    Ok(distance)
}
