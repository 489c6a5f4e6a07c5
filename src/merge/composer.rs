//! Document composition.
//!
//! Concatenates an ordered list of source documents into one output. The
//! first source is the base: its styles, page setup and headers win. A page
//! break follows every source, including the last, so each source starts on
//! a fresh page and the output always ends with a break.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{DocMergeError, Result};
use crate::io::DocxDocument;

/// Statistics about one composed document.
#[derive(Debug, Clone)]
pub struct ComposeStatistics {
    /// Number of sources concatenated.
    pub sources_merged: usize,

    /// Number of page breaks inserted.
    pub page_breaks: usize,

    /// Size of the written file in bytes.
    pub output_size: u64,

    /// Where the output was written.
    pub output_path: PathBuf,

    /// Wall time for load, append and save.
    pub compose_time: Duration,
}

/// Builds one output document from ordered sources.
#[derive(Debug, Clone, Default)]
pub struct DocumentComposer;

impl DocumentComposer {
    /// Create a new composer.
    pub fn new() -> Self {
        Self
    }

    /// Concatenate `sources` into `destination`.
    ///
    /// Parent directories of `destination` are created and an existing file
    /// there is replaced. Nothing is written unless every source loads and
    /// appends cleanly.
    ///
    /// # Errors
    ///
    /// - [`DocMergeError::NoSourceDocuments`] if `sources` is empty.
    /// - Any load, append or write error of the document layer.
    pub fn compose(&self, sources: &[PathBuf], destination: &Path) -> Result<ComposeStatistics> {
        let start = Instant::now();

        let Some((first, rest)) = sources.split_first() else {
            return Err(DocMergeError::NoSourceDocuments);
        };

        tracing::debug!(base = %first.display(), "loading base document");
        let mut composed = DocxDocument::load(first)?;
        composed.add_page_break()?;
        let mut page_breaks = 1;

        for source in rest {
            tracing::debug!(source = %source.display(), "appending");
            let next = DocxDocument::load(source)?;
            composed.append(&next)?;
            composed.add_page_break()?;
            page_breaks += 1;
        }

        let written = composed.save(destination)?;

        Ok(ComposeStatistics {
            sources_merged: sources.len(),
            page_breaks,
            output_size: written.file_size,
            output_path: written.output_path,
            compose_time: start.elapsed(),
        })
    }
}
