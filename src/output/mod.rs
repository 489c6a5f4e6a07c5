//! Output formatting and display for docmerge.
//!
//! This module handles all user-facing console output:
//! - Formatted status messages
//! - Per-job progress
//! - Run and dry-run summaries
//!
//! The run log and error log are not console output; see
//! [`crate::logging`].
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::config::Config;
//! use docmerge::output::OutputFormatter;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Reading manifest");
//! formatter.success("All documents merged");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::JobProgress;

use crate::config::Config;
use crate::runner::{RunPlan, RunSummary};

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Display the totals of a finished run.
pub fn display_run_summary(formatter: &OutputFormatter, summary: &RunSummary) {
    formatter.section("Summary");
    formatter.info(&format!(
        "  {} job(s): {} merged, {} skipped (missing inputs), {} failed",
        summary.total, summary.succeeded, summary.skipped, summary.failed
    ));

    if summary.rejected_rows > 0 {
        formatter.warning(&format!(
            "{} manifest row(s) ignored",
            summary.rejected_rows
        ));
    }

    if summary.total > 0 && summary.all_succeeded() {
        formatter.success(&format!("All {} job(s) merged", summary.total));
    }

    formatter.info(&format!("  Run log: {}", summary.log_path.display()));

    if let Some(ref error_log) = summary.error_log_path {
        formatter.warning(&format!(
            "{} merge(s) failed; details in {}",
            summary.failed,
            error_log.display()
        ));
    }
}

/// Display what a run would do.
pub fn display_plan(formatter: &OutputFormatter, plan: &RunPlan) {
    formatter.info("🔍 DRY RUN MODE - No files will be created");
    formatter.section(&format!("{} job(s) in manifest:", plan.jobs.len()));

    for (index, planned) in plan.jobs.iter().enumerate() {
        let status = if planned.validation.is_valid() {
            "ready".to_string()
        } else {
            format!("missing: {}", planned.validation.missing_list())
        };
        formatter.list_item(
            index + 1,
            &format!(
                "{} <- {} source(s) [{status}]",
                planned.job.output_name,
                planned.job.source_paths.len()
            ),
        );
        for source in &planned.job.source_paths {
            formatter.detail("source", &source.display().to_string());
        }
        formatter.detail("output", &planned.destination.display().to_string());
    }

    for rejected in &plan.rejected_rows {
        formatter.warning(&format!(
            "Manifest row {} ignored: {}",
            rejected.row, rejected.reason
        ));
    }

    formatter.blank_line();
    formatter.success(&format!(
        "Dry run completed: {} ready, {} would be skipped",
        plan.ready(),
        plan.blocked()
    ));
    formatter.info("  Run without --dry-run to write the merged documents");
}
