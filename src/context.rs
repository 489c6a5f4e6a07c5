//! Run-scoped context.
//!
//! A [`RunContext`] is built once at startup and handed to every component of
//! the run. It fixes the run id (the start timestamp) so the run log, the
//! error log and every job agree on it.

use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::config::{Config, DOCUMENT_SUBDIR, LogFormat};

/// Format of the run id, e.g. `20261018093015`.
pub const RUN_ID_FORMAT: &str = "%Y%m%d%H%M%S";

/// Values shared by every stage of one run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Start timestamp, formatted with [`RUN_ID_FORMAT`].
    pub run_id: String,

    /// When the run started.
    pub started_at: DateTime<Local>,

    /// Input root directory.
    pub input_root: PathBuf,

    /// Output root directory.
    pub output_root: PathBuf,

    /// Error-log root directory.
    pub error_root: PathBuf,

    /// Manifest spreadsheet.
    pub manifest_path: PathBuf,

    /// Whether the manifest's first row is a header.
    pub has_header: bool,

    /// Run log path.
    pub log_path: PathBuf,

    /// Error log path; the file only exists once a failure was recorded.
    pub error_log_path: PathBuf,

    /// Run log line format.
    pub log_format: LogFormat,
}

impl RunContext {
    /// Create the context for a run starting now.
    pub fn from_config(config: &Config) -> Self {
        Self::started_at(config, Local::now())
    }

    /// Create the context for a run that started at `started_at`.
    pub fn started_at(config: &Config, started_at: DateTime<Local>) -> Self {
        let run_id = started_at.format(RUN_ID_FORMAT).to_string();

        let log_path = config.output_dir.join(format!(
            "log_{run_id}.{}",
            config.log_format.extension()
        ));
        let error_log_path = config.error_dir.join(format!("error_{run_id}.txt"));

        Self {
            run_id,
            started_at,
            input_root: config.input_dir.clone(),
            output_root: config.output_dir.clone(),
            error_root: config.error_dir.clone(),
            manifest_path: config.manifest.clone(),
            has_header: config.has_header,
            log_path,
            error_log_path,
            log_format: config.log_format,
        }
    }

    /// Directory source documents are resolved against.
    pub fn documents_input_dir(&self) -> PathBuf {
        self.input_root.join(DOCUMENT_SUBDIR)
    }

    /// Directory merged documents are written to.
    pub fn documents_output_dir(&self) -> PathBuf {
        self.output_root.join(DOCUMENT_SUBDIR)
    }
}
