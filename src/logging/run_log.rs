//! Run log and error log.
//!
//! The run log gets exactly one line per manifest entry, appended as the
//! entry finishes, so an interrupted run still leaves a record of every
//! entry processed so far. In text format a line reads:
//!
//! ```text
//! report Success
//! memo MissingInputs (/data/input/docx/memo.docx)
//! broken MergeFailed (Corrupted or invalid document: ...)
//! ```
//!
//! In JSON format each line is one object with `job`, `outcome` and `detail`.
//!
//! The error log only exists once a merge has failed; it collects the full
//! diagnostic trace of every failure in the run.

use serde::Serialize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::LogFormat;
use crate::context::RunContext;
use crate::error::{DocMergeError, Result};

/// What happened to one manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// One or more source documents did not exist; nothing was written.
    MissingInputs,
    /// Composition failed; the trace went to the error log.
    MergeFailed,
    /// The output document was written.
    Success,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingInputs => "MissingInputs",
            Self::MergeFailed => "MergeFailed",
            Self::Success => "Success",
        };
        f.write_str(name)
    }
}

/// One run log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Job name as written in the manifest.
    pub job: String,
    /// What happened.
    pub outcome: Outcome,
    /// Missing paths or a short error message; empty on success.
    pub detail: String,
}

impl LogEntry {
    /// Create an entry.
    pub fn new(job: impl Into<String>, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            outcome,
            detail: detail.into(),
        }
    }

    /// Render as one line (without the newline).
    pub fn to_line(&self, format: LogFormat) -> serde_json::Result<String> {
        match format {
            LogFormat::Text => Ok(self.to_string()),
            LogFormat::Json => serde_json::to_string(self),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.job, self.outcome)?;
        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }
        Ok(())
    }
}

/// Appends to the run log and error log of one run.
#[derive(Debug, Clone)]
pub struct RunLogger {
    log_path: PathBuf,
    error_log_path: PathBuf,
    format: LogFormat,
}

impl RunLogger {
    /// Create the output directory and an empty run log.
    ///
    /// # Errors
    ///
    /// Returns [`DocMergeError::LogWriteFailed`] if either cannot be created.
    pub fn open(ctx: &RunContext) -> Result<Self> {
        create_parent(&ctx.log_path)?;

        // Runs started within the same second share a run id; later ones get
        // `_2`, `_3`, ... on both log names.
        let mut attempt = 1usize;
        loop {
            let (log_path, error_log_path) = if attempt == 1 {
                (ctx.log_path.clone(), ctx.error_log_path.clone())
            } else {
                (
                    with_suffix(&ctx.log_path, attempt),
                    with_suffix(&ctx.error_log_path, attempt),
                )
            };

            match OpenOptions::new().write(true).create_new(true).open(&log_path) {
                Ok(_) => {
                    tracing::debug!(log = %log_path.display(), "run log opened");
                    return Ok(Self {
                        log_path,
                        error_log_path,
                        format: ctx.log_format,
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(DocMergeError::LogWriteFailed {
                        path: log_path,
                        source: e,
                    });
                }
            }
        }
    }

    /// Append one entry to the run log.
    pub fn record(&self, job: &str, outcome: Outcome, detail: &str) -> Result<()> {
        self.record_entry(&LogEntry::new(job, outcome, detail))
    }

    /// Append a prepared entry to the run log.
    pub fn record_entry(&self, entry: &LogEntry) -> Result<()> {
        let line = entry
            .to_line(self.format)
            .map_err(|e| DocMergeError::LogWriteFailed {
                path: self.log_path.clone(),
                source: std::io::Error::other(e),
            })?;
        append_line(&self.log_path, &line)
    }

    /// Append a failure trace to the error log, creating it on first use.
    pub fn record_error(&self, trace: &str) -> Result<()> {
        create_parent(&self.error_log_path)?;
        append_line(&self.error_log_path, trace.trim_end())
    }

    /// Run log path.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Error log path; may not exist yet.
    pub fn error_log_path(&self) -> &Path {
        &self.error_log_path
    }
}

fn with_suffix(path: &Path, attempt: usize) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{attempt}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{attempt}"),
    };
    path.with_file_name(name)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| DocMergeError::LogWriteFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let log_err = |source| DocMergeError::LogWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_err)?;
    writeln!(file, "{line}").map_err(log_err)?;
    file.flush().map_err(log_err)
}
