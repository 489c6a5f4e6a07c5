//! CLI argument parsing for docmerge.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let config = cli.to_config().expect("Invalid configuration");
//! println!("Reading manifest {}", config.manifest.display());
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{Config, LogFormat};
use crate::error::Result;
use crate::utils;

/// Merge Word documents in batch according to a spreadsheet manifest.
///
/// Each manifest row names an output document followed by the source
/// documents to concatenate, in order. Sources are read from
/// `<input-dir>/docx`, merged documents are written to `<output-dir>/docx`,
/// and every run leaves a timestamped log in the output directory.
#[derive(Parser, Debug)]
#[command(name = "docmerge")]
#[command(version)]
#[command(about = "Merge Word documents in batch according to a spreadsheet manifest", long_about = None)]
#[command(author)]
pub struct Cli {
    /// Input root directory
    ///
    /// Source documents named in the manifest are resolved against
    /// the `docx` subfolder of this directory.
    #[arg(short, long, value_name = "DIR", default_value = "input")]
    #[arg(env = "DOCMERGE_INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output root directory
    ///
    /// Merged documents are written to its `docx` subfolder and the run
    /// log (log_<timestamp>.txt) is written here.
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    #[arg(env = "DOCMERGE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Directory for the error log (error_<timestamp>.txt)
    ///
    /// The error log is only created when a merge fails.
    #[arg(short, long, value_name = "DIR", default_value = "error")]
    #[arg(env = "DOCMERGE_ERROR_DIR")]
    pub error_dir: PathBuf,

    /// Manifest spreadsheet (xlsx, xlsm, xls, ods or csv)
    ///
    /// Defaults to the first spreadsheet found in the input directory.
    ///
    /// Row layout (no header):
    ///   output name | source 1 | source 2 | ...
    #[arg(short, long, value_name = "FILE")]
    #[arg(env = "DOCMERGE_DATA")]
    pub data: Option<PathBuf>,

    /// Treat the manifest's first row as a header and skip it
    #[arg(long)]
    pub has_header: bool,

    /// Run log line format
    ///
    /// - text: `<job> <Outcome> (<detail>)`
    /// - json: one JSON object per line
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    #[arg(value_parser = ["text", "json"])]
    #[arg(env = "DOCMERGE_LOG_FORMAT")]
    pub log_format: String,

    /// Dry run - validate every job and show the plan without writing files
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show every source of every job
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// When no manifest is given, the input directory is searched for one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Log format is invalid
    /// - No manifest was given and none can be found
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let log_format = LogFormat::from_str(&self.log_format)?;

        let manifest = match self.data {
            Some(ref path) => path.clone(),
            None => utils::discover_manifest(&self.input_dir)?,
        };

        let config = Config {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            error_dir: self.error_dir.clone(),
            manifest,
            has_header: self.has_header,
            log_format,
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        config.validate()?;

        Ok(config)
    }
}
