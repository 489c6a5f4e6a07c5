//! Manifest parsing.
//!
//! A manifest is a table without a header row. Every row describes one merge
//! job: the first cell names the output document, the remaining cells name
//! the source documents to concatenate, in order.
//!
//! ```text
//! | A      | B         | C         | D |
//! | report | cover.docx| body.docx |   |
//! | memo   | memo.docx |           |   |
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::config::Config;
//! use docmerge::context::RunContext;
//! use docmerge::manifest::ManifestReader;
//!
//! # fn example() -> docmerge::Result<()> {
//! let config = Config::new("input", "output", "error", "input/jobs.xlsx");
//! let ctx = RunContext::from_config(&config);
//! let manifest = ManifestReader::new(&ctx).read(&ctx.manifest_path)?;
//! println!("{} job(s)", manifest.jobs.len());
//! # Ok(())
//! # }
//! ```

pub mod table;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::DOCUMENT_EXTENSION;
use crate::context::RunContext;
use crate::error::{DocMergeError, Result};

pub use table::Row;

/// One manifest row: an output document and its ordered sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeJob {
    /// Output name as written in the manifest; the run log uses it.
    pub name: String,

    /// Output file name, always ending in `.docx`.
    pub output_name: String,

    /// Absolute source paths, in concatenation order. Duplicates are kept.
    pub source_paths: Vec<PathBuf>,

    /// 1-based manifest row number.
    pub row: usize,
}

/// A row that carried data but could not form a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based manifest row number.
    pub row: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Parsed manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    /// Jobs in manifest order.
    pub jobs: Vec<MergeJob>,

    /// Rows that could not form a job.
    pub rejected_rows: Vec<RejectedRow>,
}

/// Loads a manifest into merge jobs.
pub struct ManifestReader {
    documents_dir: PathBuf,
    has_header: bool,
}

impl ManifestReader {
    /// Create a reader resolving sources under the run's input documents dir.
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            documents_dir: ctx.documents_input_dir(),
            has_header: ctx.has_header,
        }
    }

    /// Read the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocMergeError::ManifestUnreadable`] if the file does not
    /// exist or cannot be parsed as tabular data, or if the documents
    /// directory cannot be made absolute.
    pub fn read(&self, path: &Path) -> Result<Manifest> {
        let rows = table::read_rows(path)?;
        let skip = usize::from(self.has_header);

        let mut manifest = Manifest::default();
        for (index, cells) in rows.iter().enumerate().skip(skip) {
            let row = index + 1;
            match self.parse_row(row, cells) {
                Ok(Some(job)) => manifest.jobs.push(job),
                Ok(None) => {}
                Err(reason) => {
                    tracing::warn!(row, %reason, "manifest row rejected");
                    manifest.rejected_rows.push(RejectedRow { row, reason });
                }
            }
        }

        tracing::debug!(
            manifest = %path.display(),
            jobs = manifest.jobs.len(),
            rejected = manifest.rejected_rows.len(),
            "manifest loaded"
        );

        Ok(manifest)
    }

    /// Turn one row into a job.
    ///
    /// Returns `Ok(None)` for a fully blank row and `Err(reason)` for a row
    /// with sources but no output name.
    fn parse_row(&self, row: usize, cells: &[String]) -> std::result::Result<Option<MergeJob>, String> {
        let mut cells = cells.iter().map(|cell| cell.trim());

        let output_name = cells.next().unwrap_or("");
        let sources: Vec<&str> = cells.filter(|cell| !cell.is_empty()).collect();

        if output_name.is_empty() {
            if sources.is_empty() {
                return Ok(None);
            }
            return Err(format!(
                "missing output name for {} source(s)",
                sources.len()
            ));
        }

        let source_paths = sources
            .into_iter()
            .map(|source| self.resolve(source))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.to_string())?;

        Ok(Some(MergeJob {
            name: output_name.to_string(),
            output_name: with_document_extension(output_name),
            source_paths,
            row,
        }))
    }

    fn resolve(&self, source: &str) -> Result<PathBuf> {
        std::path::absolute(self.documents_dir.join(source)).map_err(DocMergeError::from)
    }
}

/// Append `.docx` unless the name already ends with it.
pub fn with_document_extension(name: &str) -> String {
    let has_extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));

    if has_extension {
        name.to_string()
    } else {
        format!("{name}.{DOCUMENT_EXTENSION}")
    }
}
