//! Utilities for manifest discovery, path expansion and size formatting.

use crate::{Result, error::DocMergeError};
use std::path::{Path, PathBuf};

/// Manifest extensions, in discovery preference order.
pub const MANIFEST_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods", "csv"];

/// Find the default manifest inside `dir`.
///
/// Extensions are tried in [`MANIFEST_EXTENSIONS`] order; within one
/// extension the lexicographically first file wins.
///
/// Errors:
/// - [`DocMergeError::ManifestNotFound`] if no candidate exists.
/// - Propagates `glob` parse and filesystem errors.
pub fn discover_manifest(dir: &Path) -> Result<PathBuf> {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());

    for extension in MANIFEST_EXTENSIONS {
        let pattern = format!("{escaped}/*.{extension}");
        let mut candidates: Vec<PathBuf> = collect_paths_for_pattern(&pattern)?
            .into_iter()
            .filter(|path| path.is_file() && !is_lock_file(path))
            .collect();
        candidates.sort();

        if let Some(first) = candidates.into_iter().next() {
            return Ok(first);
        }
    }

    Err(DocMergeError::ManifestNotFound {
        dir: dir.to_path_buf(),
    })
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"input/*.xlsx"`
/// - `"./input/*.csv"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern.as_ref())
        .map_err(|err| DocMergeError::invalid_config(err.to_string()))?;

    for entry in paths {
        let path = entry.map_err(|err| DocMergeError::Io {
            source: err.into(),
        })?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

// Office keeps `~$name.xlsx` owner files next to open workbooks.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
