// src/dag/builder.rs

//! Emission of the full submission artifact set.
//!
//! One `DagBuilder::build` call produces, inside the output directory:
//!
//! - `<jobname>.items.tsv`: the items manifest freezing the ordinal-to-path
//!   mapping;
//! - `<jobname>.batch.<b>.tsv`: one manifest per batch with that batch's
//!   pair argument-tuples;
//! - `<jobname>.batch.<b>.condor`: one submit description per batch, each
//!   queueing a single proc that runs `pairdag run-batch` over the manifest;
//! - `<jobname>.collect.condor` / `<jobname>.matrix.condor`: the two
//!   synthetic downstream nodes;
//! - `<jobname>.dag`: the DAG description wiring every batch node into the
//!   collect node and the collect node into the matrix node.
//!
//! Batch nodes carry no edges among themselves; they are the exploitable
//! parallelism. Executables are resolved and checked before anything is
//! written, so a missing collaborator fails the build rather than the run.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::batch::{self, Batch};
use crate::config::model::SubmitSection;
use crate::dag::graph::JobDag;
use crate::discover::ItemSet;
use crate::errors::{PairdagError, Result};
use crate::pairs::{self, enumerate_from};

/// Options for one submission, all explicit.
///
/// The accounting group and project tag historically leaked in from the
/// environment; here they arrive through [`SubmitSection`] so a submission
/// is reproducible from its inputs alone.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Prefix for every generated artifact file name.
    pub jobname: String,
    /// Directory receiving all artifacts. Created if absent.
    pub outdir: PathBuf,
    /// Maximum pairs per batch.
    pub numjobs: usize,
    /// Distance collaborator: a path, or a bare name searched on PATH.
    pub exe: String,
}

/// Summary of an emitted submission, returned to the caller for reporting.
#[derive(Debug)]
pub struct Submission {
    pub dag_file: PathBuf,
    pub items_manifest: PathBuf,
    pub item_count: usize,
    pub pair_count: usize,
    pub batch_count: usize,
}

/// Builds and writes the submission DAG for one item set.
pub struct DagBuilder<'a> {
    items: &'a ItemSet,
    submit: &'a SubmitSection,
    opts: SubmitOptions,
}

impl<'a> DagBuilder<'a> {
    pub fn new(items: &'a ItemSet, submit: &'a SubmitSection, opts: SubmitOptions) -> Self {
        Self {
            items,
            submit,
            opts,
        }
    }

    /// Emit every artifact for this submission.
    ///
    /// Fails with `MissingDependency` before writing anything if either the
    /// distance collaborator or the pairdag binary itself cannot be located.
    pub fn build(&self) -> Result<Submission> {
        let exe = resolve_executable(&self.opts.exe)?;
        let pairdag_bin = std::env::current_exe().map_err(|e| {
            PairdagError::MissingDependency(format!(
                "cannot resolve the pairdag binary for the generated jobs: {e}"
            ))
        })?;

        fs::create_dir_all(&self.opts.outdir)
            .with_context(|| format!("creating output directory {:?}", self.opts.outdir))?;

        let n = self.items.len();
        let total_pairs = pairs::pair_count(n);
        let batches = batch::partition(total_pairs, self.opts.numjobs)?;

        info!(
            items = n,
            pairs = total_pairs,
            batches = batches.len(),
            outdir = %self.opts.outdir.display(),
            "building submission DAG"
        );

        let items_manifest = self.artifact(".items.tsv");
        self.items.write_manifest(&items_manifest)?;

        let mut dag = JobDag::new();
        let mut batch_nodes = Vec::with_capacity(batches.len());

        for b in &batches {
            let manifest = self.artifact(&format!(".batch.{}.tsv", b.index));
            batch::write_manifest(b, self.items, &manifest)?;

            let submit_file = self.artifact(&format!(".batch.{}.condor", b.index));
            self.write_batch_submit(b, &submit_file, &manifest, &exe, &pairdag_bin)?;

            let node = dag.add_node(format!("batch{}", b.index), file_name(&submit_file));
            batch_nodes.push(node);
        }

        let collect_submit = self.artifact(".collect.condor");
        self.write_collect_submit(&collect_submit, &pairdag_bin)?;
        let collect_node = dag.add_node("collect", file_name(&collect_submit));

        let matrix_submit = self.artifact(".matrix.condor");
        self.write_matrix_submit(&matrix_submit, &items_manifest, &pairdag_bin)?;
        let matrix_node = dag.add_node("matrix", file_name(&matrix_submit));

        for node in batch_nodes {
            dag.add_edge(node, collect_node);
        }
        dag.add_edge(collect_node, matrix_node);

        let dag_file = self.artifact(".dag");
        dag.write_dag_file(&dag_file)?;

        Ok(Submission {
            dag_file,
            items_manifest,
            item_count: n,
            pair_count: total_pairs,
            batch_count: batches.len(),
        })
    }

    fn artifact(&self, suffix: &str) -> PathBuf {
        self.opts
            .outdir
            .join(format!("{}{}", self.opts.jobname, suffix))
    }

    /// Submit description for one batch node.
    ///
    /// The proc runs `pairdag run-batch` over the batch manifest; the
    /// manifest and collaborator travel with the job, so the argument list
    /// references their basenames inside the job sandbox.
    fn write_batch_submit(
        &self,
        b: &Batch,
        path: &Path,
        manifest: &Path,
        exe: &Path,
        pairdag_bin: &Path,
    ) -> Result<()> {
        let n = self.items.len();

        // Diagram files this batch touches, deduplicated across its pairs.
        // Transferred inputs land flat in the job sandbox under their
        // basenames, so two distinct paths sharing a file name would
        // overwrite each other there.
        let mut inputs: BTreeSet<PathBuf> = BTreeSet::new();
        let mut by_name: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();
        for pair in enumerate_from(b.start, n).take(b.len()) {
            let item_a = self.items.get(pair.a).expect("ordinal within item set");
            let item_b = self.items.get(pair.b).expect("ordinal within item set");
            for path in [&item_a.path, &item_b.path] {
                let name = batch::sandbox_name(path);
                if let Some(previous) = by_name.get(&name) {
                    if previous != path {
                        return Err(PairdagError::Config(format!(
                            "diagram files '{}' and '{}' would both transfer as '{}' in batch {}",
                            previous.display(),
                            path.display(),
                            name.display(),
                            b.index
                        )));
                    }
                } else {
                    by_name.insert(name, path.clone());
                }
                inputs.insert(path.clone());
            }
        }

        let mut transfers: Vec<String> = vec![
            manifest.display().to_string(),
            exe.display().to_string(),
        ];
        transfers.extend(inputs.iter().map(|p| p.display().to_string()));

        let arguments = format!(
            "run-batch --manifest {} --exe {}",
            file_name(manifest).display(),
            file_name(exe).display()
        );

        let stem = format!("{}.batch.{}", self.opts.jobname, b.index);
        self.write_submit_file(path, pairdag_bin, &arguments, &transfers, &stem)?;

        debug!(batch = b.index, pairs = b.len(), inputs = inputs.len(), "wrote batch submit file");
        Ok(())
    }

    /// Submit description for the synthetic collect node, which merges every
    /// batch `.out` artifact into one combined results stream.
    fn write_collect_submit(&self, path: &Path, pairdag_bin: &Path) -> Result<()> {
        let arguments = format!(
            "collect --dir {} --outfile {}",
            self.opts.outdir.display(),
            self.artifact(".results.tsv").display()
        );
        let stem = format!("{}.collect", self.opts.jobname);
        self.write_submit_file(path, pairdag_bin, &arguments, &[], &stem)
    }

    /// Submit description for the synthetic matrix node, which consumes the
    /// combined results plus the items manifest and writes the final matrix.
    fn write_matrix_submit(
        &self,
        path: &Path,
        items_manifest: &Path,
        pairdag_bin: &Path,
    ) -> Result<()> {
        let arguments = format!(
            "matrix --items {} --results {} --outfile {} --precision 6 --format fixed",
            items_manifest.display(),
            self.artifact(".results.tsv").display(),
            self.artifact(".matrix.csv").display()
        );
        let stem = format!("{}.matrix", self.opts.jobname);
        self.write_submit_file(path, pairdag_bin, &arguments, &[], &stem)
    }

    /// Write one submit description file with the shared `[submit]` settings.
    fn write_submit_file(
        &self,
        path: &Path,
        executable: &Path,
        arguments: &str,
        transfer_input_files: &[String],
        log_stem: &str,
    ) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating submit file {:?}", path))?;
        let mut w = BufWriter::new(file);
        let submit = self.submit;

        writeln!(w, "universe = {}", submit.universe)?;
        if let Some(ref req) = submit.requirements {
            writeln!(w, "requirements = {}", req)?;
        }
        writeln!(w, "request_cpus = {}", submit.request_cpus)?;
        writeln!(w, "request_memory = {}", submit.request_memory)?;
        writeln!(w, "request_disk = {}", submit.request_disk)?;
        if let Some(ref group) = submit.accounting_group {
            writeln!(w, "accounting_group = {}", group)?;
        }
        if let Some(ref project) = submit.project {
            writeln!(w, "+ProjectName = \"{}\"", project)?;
        }
        writeln!(w, "executable = {}", executable.display())?;
        writeln!(w, "arguments = {}", arguments)?;
        writeln!(w, "transfer_executable = true")?;
        writeln!(w, "should_transfer_files = YES")?;
        if !transfer_input_files.is_empty() {
            writeln!(w, "transfer_input_files = {}", transfer_input_files.join(","))?;
        }
        writeln!(w, "log = {}.log", log_stem)?;
        writeln!(w, "error = {}.error", log_stem)?;
        writeln!(w, "output = {}.out", log_stem)?;
        writeln!(w, "queue")?;
        w.flush()?;

        Ok(())
    }
}

/// Resolve the distance collaborator to an existing file.
///
/// An argument containing a path separator is checked as given; a bare name
/// is searched on PATH. Either way the result must exist on disk now, before
/// any artifact is written.
pub fn resolve_executable(exe: &str) -> Result<PathBuf> {
    let candidate = Path::new(exe);
    if candidate.components().count() > 1 {
        if candidate.is_file() {
            let abs = std::path::absolute(candidate)
                .with_context(|| format!("resolving absolute path for {:?}", candidate))?;
            return Ok(abs);
        }
        return Err(PairdagError::MissingDependency(format!(
            "executable not found: {}",
            candidate.display()
        )));
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        let full = dir.join(exe);
        if full.is_file() {
            return Ok(full);
        }
    }

    Err(PairdagError::MissingDependency(format!(
        "executable '{}' could not be found on PATH",
        exe
    )))
}

fn file_name(path: &Path) -> PathBuf {
    path.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf())
}
