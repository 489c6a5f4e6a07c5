//! Input validation for merge jobs.
//!
//! Every job is checked immediately before it is composed: each declared
//! source must be a regular file at check time. Nothing is cached between
//! jobs, so a file that disappears mid-run is caught by the next job that
//! needs it.
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::manifest::MergeJob;
//! use docmerge::validation::{JobValidator, ValidationResult};
//! use std::path::PathBuf;
//!
//! let job = MergeJob {
//!     name: "report".to_string(),
//!     output_name: "report.docx".to_string(),
//!     source_paths: vec![PathBuf::from("/data/input/docx/cover.docx")],
//!     row: 1,
//! };
//!
//! match JobValidator::new().validate(&job) {
//!     ValidationResult::Valid => println!("ready to merge"),
//!     ValidationResult::Invalid { missing } => println!("{} missing", missing.len()),
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::manifest::MergeJob;

/// Outcome of checking one job's inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ValidationResult {
    /// Every source exists.
    Valid,
    /// At least one source is absent.
    Invalid {
        /// Every missing source, in manifest order.
        missing: Vec<PathBuf>,
    },
}

impl ValidationResult {
    /// Whether the job may be composed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Missing sources joined for display, e.g. `a.docx, b.docx`.
    pub fn missing_list(&self) -> String {
        match self {
            Self::Valid => String::new(),
            Self::Invalid { missing } => missing
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Checks that a job's source documents exist.
#[derive(Debug, Clone, Default)]
pub struct JobValidator;

impl JobValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate a job.
    ///
    /// The whole source list is checked; one missing source invalidates the
    /// job, and all of them are reported.
    pub fn validate(&self, job: &MergeJob) -> ValidationResult {
        let missing: Vec<PathBuf> = job
            .source_paths
            .iter()
            .filter(|path| !Self::is_present(path))
            .cloned()
            .collect();

        if missing.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { missing }
        }
    }

    /// A source is present if a regular file exists there now.
    fn is_present(path: &Path) -> bool {
        path.is_file()
    }
}
