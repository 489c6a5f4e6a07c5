//! Word-processing document I/O.
//!
//! - [`package`]: the zip package as ordered parts, plus relationships and
//!   content types
//! - [`reader`] / [`writer`]: loading and atomic saving
//! - [`body`]: streaming edits of the main document body
//! - [`document`]: [`DocxDocument`], the load / append / page break / save
//!   surface the merge step uses

pub mod body;
pub mod document;
pub mod package;
pub mod reader;
pub mod writer;

pub use document::DocxDocument;
pub use reader::{DocxReader, LoadedDocument};
pub use writer::{DocxWriter, WriteOptions, WriteStatistics};
