// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::FloatFormat;

/// Command-line arguments for `pairdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pairdag",
    version,
    about = "Distribute an all-pairs distance computation as a batch DAG and reassemble the matrix.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PAIRDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Discover diagram files, partition the pairs into batches and emit
    /// every submission artifact (manifests, submit files, DAG file).
    Submit {
        /// Input directory containing diagram files.
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,

        /// Job name; prefixes every generated artifact file.
        #[arg(short, long, value_name = "NAME")]
        jobname: String,

        /// Number of pairs per batch.
        #[arg(short, long, value_name = "N", default_value_t = 100)]
        numjobs: usize,

        /// Output directory for the artifacts. Created if it does not exist.
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        outdir: PathBuf,

        /// Distance executable: a path, or a name searched on PATH.
        #[arg(short, long, value_name = "PATH-OR-NAME", default_value = "bottleneck-distance")]
        exe: String,

        /// Optional TOML config file ([discover] and [submit] sections).
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Accounting group tag for the generated submit files.
        ///
        /// Overrides `[submit].accounting_group` from the config file.
        #[arg(long, value_name = "GROUP")]
        accounting_group: Option<String>,

        /// Project tag (`+ProjectName`) for the generated submit files.
        ///
        /// Overrides `[submit].project` from the config file.
        #[arg(short, long, value_name = "NAME")]
        project: Option<String>,
    },

    /// Worker mode: run every pair of one batch manifest through the
    /// distance executable, emitting one `path_a\tpath_b\tdistance` record
    /// per pair on stdout.
    RunBatch {
        /// Batch manifest file written at submit time.
        #[arg(short, long, value_name = "FILE")]
        manifest: PathBuf,

        /// Distance executable path.
        #[arg(short, long, value_name = "PATH")]
        exe: PathBuf,
    },

    /// Merge all per-batch `.out` artifacts under a directory into one
    /// combined tab-separated results file, validating every line.
    Collect {
        /// Directory containing the batch output artifacts.
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,

        /// Combined results file to write.
        #[arg(short, long, value_name = "FILE")]
        outfile: PathBuf,
    },

    /// Assemble the distance matrix from collected results, after checking
    /// them for completeness and consistency.
    Matrix {
        /// Items manifest written at submit time (`<jobname>.items.tsv`).
        #[arg(short, long, value_name = "FILE")]
        items: PathBuf,

        /// Results source: a combined TSV file, or a directory of `.out`
        /// artifacts.
        #[arg(short, long, value_name = "FILE-or-DIR")]
        results: PathBuf,

        /// Matrix file to write (comma-delimited).
        #[arg(short, long, value_name = "FILE")]
        outfile: PathBuf,

        /// Also populate the lower triangle as a copy of the upper.
        #[arg(long)]
        mirror: bool,

        /// Number of digits after the decimal point per cell.
        #[arg(long, value_name = "P", default_value_t = 6)]
        precision: usize,

        /// Cell rendering: fixed-point or scientific notation.
        #[arg(long, value_enum, value_name = "FORMAT", default_value = "fixed")]
        format: FloatFormatArg,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// `FloatFormat` as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FloatFormatArg {
    Fixed,
    Scientific,
}

impl From<FloatFormatArg> for FloatFormat {
    fn from(arg: FloatFormatArg) -> Self {
        match arg {
            FloatFormatArg::Fixed => FloatFormat::Fixed,
            FloatFormatArg::Scientific => FloatFormat::Scientific,
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
