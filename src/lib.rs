// src/lib.rs

pub mod batch;
pub mod cli;
pub mod collect;
pub mod config;
pub mod dag;
pub mod discover;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pairs;
pub mod types;

use std::path::Path;

use tracing::info;

use crate::cli::{CliArgs, Command};
use crate::collect::{DistanceMatrix, collect_from_dir, collect_from_file, merge_artifacts};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::{DagBuilder, SubmitOptions, Submission};
use crate::discover::ItemSet;
use crate::errors::Result;

/// High-level entry point used by `main.rs`.
///
/// Dispatches the four operations:
/// - `submit`: discover → enumerate → partition → emit submission artifacts
/// - `run-batch`: the worker that a batch proc executes
/// - `collect`: the cleanup node merging batch outputs
/// - `matrix`: the final assembly step
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Submit {
            dir,
            jobname,
            numjobs,
            outdir,
            exe,
            config,
            accounting_group,
            project,
        } => {
            let mut cfg = match config {
                Some(path) => load_and_validate(&path)?,
                None => ConfigFile::default(),
            };

            // CLI flags override the config file's [submit] values.
            if accounting_group.is_some() {
                cfg.submit_mut().accounting_group = accounting_group;
            }
            if project.is_some() {
                cfg.submit_mut().project = project;
            }

            let submission = submit(&dir, &jobname, numjobs, &outdir, &exe, &cfg)?;
            println!(
                "submission ready: {} items, {} pairs, {} batches",
                submission.item_count, submission.pair_count, submission.batch_count
            );
            println!("  items manifest: {}", submission.items_manifest.display());
            println!("  dag file:       {}", submission.dag_file.display());
            Ok(())
        }

        Command::RunBatch { manifest, exe } => {
            let mut stdout = std::io::stdout();
            let pairs = exec::run_batch(&manifest, &exe, &mut stdout).await?;
            info!(pairs, "batch complete");
            Ok(())
        }

        Command::Collect { dir, outfile } => {
            let results = merge_artifacts(&dir, &outfile)?;
            println!("merged {} results into {}", results, outfile.display());
            Ok(())
        }

        Command::Matrix {
            items,
            results,
            outfile,
            mirror,
            precision,
            format,
        } => assemble_matrix(&items, &results, &outfile, mirror, precision, format.into()),
    }
}

/// Discover items under `dir` and emit the full submission artifact set.
///
/// Public so integration tests can drive the submit path without a CLI
/// round-trip.
pub fn submit(
    dir: &Path,
    jobname: &str,
    numjobs: usize,
    outdir: &Path,
    exe: &str,
    cfg: &ConfigFile,
) -> Result<Submission> {
    let items = discover::discover(dir, &cfg.discover().patterns)?;
    let opts = SubmitOptions {
        jobname: jobname.to_string(),
        outdir: outdir.to_path_buf(),
        numjobs,
        exe: exe.to_string(),
    };
    DagBuilder::new(&items, cfg.submit(), opts).build()
}

/// Collect results (from a combined file or an artifact directory), run the
/// completeness and consistency checks, and write the matrix.
pub fn assemble_matrix(
    items_manifest: &Path,
    results: &Path,
    outfile: &Path,
    mirror: bool,
    precision: usize,
    format: types::FloatFormat,
) -> Result<()> {
    let items = ItemSet::read_manifest(items_manifest)?;

    // A directory holds per-batch artifacts; anything else is read as one
    // combined TSV stream. Both paths run the same checks.
    let results = if results.is_dir() {
        collect_from_dir(results, &items)?
    } else {
        collect_from_file(results, &items)?
    };

    let mut matrix = DistanceMatrix::from_results(&results)?;
    if mirror {
        matrix.mirror();
    }
    matrix.write_csv(outfile, precision, format)?;

    println!(
        "matrix written: {} ({}x{})",
        outfile.display(),
        matrix.size(),
        matrix.size()
    );
    Ok(())
}
