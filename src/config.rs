//! Configuration module for docmerge.
//!
//! This module holds the validated, normalized configuration that drives a
//! merge run. It is built from CLI arguments by [`crate::cli::Cli::to_config`]
//! and handles:
//! - Validation of argument combinations
//! - Application of defaults
//! - Layout of the input and output directory trees

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DocMergeError, Result};

/// Subfolder of the input and output roots that holds documents.
pub const DOCUMENT_SUBDIR: &str = "docx";

/// Extension given to output documents.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Line format of the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// `<job> <Outcome> (<detail>)`, one per line.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// File extension used for run logs in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "jsonl",
        }
    }
}

impl FromStr for LogFormat {
    type Err = DocMergeError;

    /// Parse log format from string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `text` or `json`.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(DocMergeError::invalid_config(format!(
                "Invalid log format: {s}. Must be one of: text, json"
            ))),
        }
    }
}

/// Complete configuration for a merge run.
///
/// This structure contains all settings needed to perform a run,
/// derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input root; sources resolve under `<input_dir>/docx`.
    pub input_dir: PathBuf,

    /// Output root; merged documents land in `<output_dir>/docx`.
    pub output_dir: PathBuf,

    /// Directory receiving the run's error log.
    pub error_dir: PathBuf,

    /// Manifest spreadsheet.
    pub manifest: PathBuf,

    /// Skip the manifest's first row.
    pub has_header: bool,

    /// Run log line format.
    pub log_format: LogFormat,

    /// Dry run mode - validate without writing anything.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Config {
    /// Create a configuration with default flags for the given directories.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        error_dir: impl Into<PathBuf>,
        manifest: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            error_dir: error_dir.into(),
            manifest: manifest.into(),
            has_header: false,
            log_format: LogFormat::default(),
            dry_run: false,
            verbose: false,
            quiet: false,
        }
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - The input and output roots are the same directory
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            return Err(DocMergeError::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if same_location(&self.input_dir, &self.output_dir) {
            return Err(DocMergeError::invalid_config(format!(
                "Output directory cannot be the same as the input directory: {}",
                self.output_dir.display()
            )));
        }

        Ok(())
    }

    /// Check if non-error output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
