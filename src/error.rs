//! Error types for docmerge.
//!
//! Errors fall into two groups:
//!
//! - **Run errors**: the manifest cannot be found or read, the configuration is
//!   invalid, or the run log cannot be written. These terminate the run.
//! - **Job errors**: a source document cannot be loaded, appended or saved.
//!   These are caught at the job boundary by the runner and turned into log
//!   entries; they never terminate the run.

use std::io;
use std::path::PathBuf;

/// Result type alias for docmerge operations.
pub type Result<T> = std::result::Result<T, DocMergeError>;

/// Main error type for docmerge operations.
#[derive(Debug, thiserror::Error)]
pub enum DocMergeError {
    /// No manifest was given and none was found in the input directory.
    #[error(
        "No manifest found in: {}\n  Hint: place a spreadsheet (*.xlsx, *.xls, *.ods, *.csv) there or pass --data",
        .dir.display()
    )]
    ManifestNotFound {
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// Manifest is missing or cannot be parsed as tabular data.
    #[error("Cannot read manifest: {}\n  Reason: {reason}", .path.display())]
    ManifestUnreadable {
        /// Path to the manifest.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A job declared no source documents.
    #[error("No source documents to merge")]
    NoSourceDocuments,

    /// Appended content relies on package parts that cannot be carried over.
    #[error("Unsupported document content: {}\n  Details: {details}", .path.display())]
    UnsupportedContent {
        /// Path to the document.
        path: PathBuf,
        /// What could not be carried over.
        details: String,
    },

    /// Failed to open or read a document package.
    #[error("Failed to load document: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadDocument {
        /// Path to the document.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Document package is structurally invalid.
    #[error("Corrupted or invalid document: {}\n  Details: {details}", .path.display())]
    CorruptedDocument {
        /// Path to the document.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// An XML part could not be parsed or rewritten.
    #[error("Malformed XML in part {part}: {reason}")]
    Xml {
        /// Package part name, e.g. `word/document.xml`.
        part: String,
        /// Parser or writer message.
        reason: String,
    },

    /// Failed to write the merged document.
    #[error("Failed to write document: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to append to the run log or error log.
    #[error("Failed to write log file: {}\n  Reason: {source}", .path.display())]
    LogWriteFailed {
        /// Path to the log file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
}

impl DocMergeError {
    /// Create a ManifestUnreadable error.
    pub fn manifest_unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ManifestUnreadable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FailedToLoadDocument error.
    pub fn failed_to_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a CorruptedDocument error.
    pub fn corrupted(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::CorruptedDocument {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an UnsupportedContent error.
    pub fn unsupported(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        Self::UnsupportedContent {
            path: path.into(),
            details: details.into(),
        }
    }

    /// Create an Xml error for a package part.
    pub fn xml(part: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Xml {
            part: part.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error ends the whole run.
    ///
    /// Everything else is confined to the job that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ManifestNotFound { .. }
                | Self::ManifestUnreadable { .. }
                | Self::InvalidConfig { .. }
                | Self::LogWriteFailed { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig { .. } => 1,
            Self::ManifestNotFound { .. } => 2,
            Self::ManifestUnreadable { .. } => 2,
            Self::NoSourceDocuments => 3,
            Self::FailedToLoadDocument { .. } => 3,
            Self::CorruptedDocument { .. } => 3,
            Self::UnsupportedContent { .. } => 3,
            Self::Xml { .. } => 3,
            Self::FailedToWrite { .. } => 5,
            Self::LogWriteFailed { .. } => 5,
            Self::Io { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_manifest_unreadable_display() {
        let err = DocMergeError::manifest_unreadable("input/jobs.xlsx", "not a workbook");
        let msg = err.to_string();
        assert!(msg.contains("Cannot read manifest"));
        assert!(msg.contains("jobs.xlsx"));
        assert!(msg.contains("not a workbook"));
    }

    #[test]
    fn test_manifest_not_found_has_hint() {
        let err = DocMergeError::ManifestNotFound {
            dir: PathBuf::from("input"),
        };
        let msg = err.to_string();
        assert!(msg.contains("No manifest found"));
        assert!(msg.contains("--data"));
    }

    #[test]
    fn test_xml_error_names_part() {
        let err = DocMergeError::xml("word/document.xml", "unexpected EOF");
        assert_eq!(
            err.to_string(),
            "Malformed XML in part word/document.xml: unexpected EOF"
        );
    }

    #[test]
    fn test_is_fatal() {
        assert!(DocMergeError::manifest_unreadable("m.csv", "x").is_fatal());
        assert!(DocMergeError::invalid_config("x").is_fatal());

        assert!(!DocMergeError::NoSourceDocuments.is_fatal());
        assert!(!DocMergeError::corrupted("a.docx", "x").is_fatal());
        assert!(!DocMergeError::failed_to_load("a.docx", "x").is_fatal());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DocMergeError::invalid_config("x").exit_code(), 1);
        assert_eq!(
            DocMergeError::manifest_unreadable("m.csv", "x").exit_code(),
            2
        );
        assert_eq!(DocMergeError::NoSourceDocuments.exit_code(), 3);
        assert_eq!(DocMergeError::unsupported("a.docx", "x").exit_code(), 3);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err: DocMergeError = io_err.into();
        assert!(matches!(err, DocMergeError::Io { .. }));
    }

    #[test]
    fn test_error_source() {
        let err = DocMergeError::FailedToWrite {
            path: PathBuf::from("out.docx"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(DocMergeError::NoSourceDocuments.source().is_none());
    }
}
