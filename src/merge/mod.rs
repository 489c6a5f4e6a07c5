//! Merge composition.
//!
//! Turns one validated job into one output document.
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::merge::DocumentComposer;
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> docmerge::Result<()> {
//! let sources = vec![
//!     PathBuf::from("input/docx/cover.docx"),
//!     PathBuf::from("input/docx/body.docx"),
//! ];
//! let stats = DocumentComposer::new().compose(&sources, Path::new("output/docx/report.docx"))?;
//! println!("{} sources, {} bytes", stats.sources_merged, stats.output_size);
//! # Ok(())
//! # }
//! ```

pub mod composer;

pub use composer::{ComposeStatistics, DocumentComposer};
