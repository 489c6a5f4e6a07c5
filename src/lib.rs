//! # docmerge
//!
//! Batch concatenation of Word (`.docx`) documents driven by a spreadsheet
//! manifest.
//!
//! Every manifest row names an output document followed by the source
//! documents to concatenate. For each row the sources are checked, loaded
//! and joined in order with a page break after each one, and the result is
//! written under the output directory. Every row leaves exactly one line in
//! a timestamped run log; failures additionally leave a diagnostic trace in
//! the error log.
//!
//! ## Example
//!
//! ```no_run
//! use docmerge::{Config, MergeRunner, RunContext};
//!
//! # fn example() -> docmerge::Result<()> {
//! let config = Config::new("input", "output", "error", "input/jobs.xlsx");
//! config.validate()?;
//!
//! let ctx = RunContext::from_config(&config);
//! let summary = MergeRunner::new(&ctx).run()?;
//!
//! println!(
//!     "{} merged, {} skipped, {} failed (log: {})",
//!     summary.succeeded,
//!     summary.skipped,
//!     summary.failed,
//!     summary.log_path.display()
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod io;
pub mod logging;
pub mod manifest;
pub mod merge;
pub mod output;
pub mod runner;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use context::RunContext;
pub use error::{DocMergeError, Result};
pub use runner::{JobOutcome, MergeRunner, RunPlan, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
