//! Document writing and saving.
//!
//! Writes a [`DocxPackage`] back to a zip archive with:
//! - Atomic writes (write to temp file, then rename)
//! - Deflate compression
//! - Parent directory creation
//! - Write statistics
//!
//! Existing output files are overwritten.
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::io::reader::DocxReader;
//! use docmerge::io::writer::DocxWriter;
//! use std::path::Path;
//!
//! # fn example() -> docmerge::Result<()> {
//! let loaded = DocxReader::new().load(Path::new("cover.docx"))?;
//! let stats = DocxWriter::new().save_with_stats(&loaded.package, Path::new("out/cover.docx"))?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::{DocMergeError, Result};
use crate::io::package::DocxPackage;
use crate::utils::format_file_size;

/// Options for writing document files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Deflate parts instead of storing them.
    pub compress: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compress: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Document writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    options: WriteOptions,
}

impl DocxWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Save a package to a file.
    ///
    /// # Errors
    ///
    /// Returns [`DocMergeError::FailedToWrite`] if the directory cannot be
    /// created or the archive cannot be written or renamed into place.
    pub fn save(&self, package: &DocxPackage, path: &Path) -> Result<()> {
        self.save_with_stats(package, path).map(|_| ())
    }

    /// Save a package and return statistics about the operation.
    pub fn save_with_stats(&self, package: &DocxPackage, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| DocMergeError::FailedToWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let write_path = if self.options.atomic {
            temp_path_for(path)
        } else {
            path.to_path_buf()
        };

        if let Err(err) = self.write_archive(package, &write_path) {
            if self.options.atomic {
                let _ = fs::remove_file(&write_path);
            }
            return Err(err);
        }

        if self.options.atomic {
            fs::rename(&write_path, path).map_err(|e| {
                let _ = fs::remove_file(&write_path);
                DocMergeError::FailedToWrite {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        tracing::debug!(path = %path.display(), file_size, "document written");

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
        })
    }

    fn write_archive(&self, package: &DocxPackage, write_path: &Path) -> Result<()> {
        let write_err = |source: std::io::Error| DocMergeError::FailedToWrite {
            path: write_path.to_path_buf(),
            source,
        };

        let file = File::create(write_path).map_err(write_err)?;
        let mut zip = zip::ZipWriter::new(BufWriter::with_capacity(self.options.buffer_size, file));

        let method = if self.options.compress {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default().compression_method(method);

        for part in package.parts() {
            zip.start_file(part.name.as_str(), options)
                .map_err(|e| write_err(std::io::Error::other(e)))?;
            zip.write_all(&part.data).map_err(write_err)?;
        }

        let mut writer = zip
            .finish()
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        writer.flush().map_err(write_err)?;

        Ok(())
    }
}

/// Temp file next to `path`, e.g. `A.docx` -> `A.docx.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
