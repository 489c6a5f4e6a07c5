//! Document loading.
//!
//! Reads a `.docx` archive into a [`DocxPackage`], keeping every part so the
//! merged output carries the base document's styles, numbering, headers and
//! settings unchanged.
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::io::reader::DocxReader;
//! use std::path::Path;
//!
//! # fn example() -> docmerge::Result<()> {
//! let loaded = DocxReader::new().load(Path::new("input/docx/cover.docx"))?;
//! println!("{} parts in {:?}", loaded.package.parts().len(), loaded.load_time);
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{DocMergeError, Result};
use crate::io::package::{DocxPackage, Part};

/// A loaded document with metadata.
#[derive(Debug)]
pub struct LoadedDocument {
    /// The document package.
    pub package: DocxPackage,

    /// Path to the source file.
    pub path: PathBuf,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

/// Loads `.docx` packages from disk.
#[derive(Debug, Clone, Default)]
pub struct DocxReader;

impl DocxReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a document package.
    ///
    /// # Errors
    ///
    /// - [`DocMergeError::FailedToLoadDocument`] if the file cannot be opened
    ///   or an entry cannot be read.
    /// - [`DocMergeError::CorruptedDocument`] if the file is not a zip
    ///   archive or has no main document part.
    pub fn load(&self, path: &Path) -> Result<LoadedDocument> {
        let start = Instant::now();

        let file = File::open(path).map_err(|e| DocMergeError::failed_to_load(path, e.to_string()))?;
        let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| DocMergeError::corrupted(path, format!("not a document package: {e}")))?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| DocMergeError::corrupted(path, e.to_string()))?;

            if entry.is_dir() {
                continue;
            }

            let mut data = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut data)
                .map_err(|e| DocMergeError::failed_to_load(path, format!("{}: {e}", entry.name())))?;

            parts.push(Part {
                name: entry.name().to_string(),
                data,
            });
        }

        let package = DocxPackage::new(path, parts);
        package.document_xml()?;

        tracing::debug!(
            path = %path.display(),
            parts = package.parts().len(),
            file_size,
            "document loaded"
        );

        Ok(LoadedDocument {
            package,
            path: path.to_path_buf(),
            load_time: start.elapsed(),
            file_size,
        })
    }
}
