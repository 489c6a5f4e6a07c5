//! Batch orchestration.
//!
//! [`MergeRunner`] drives one run: it reads the manifest, then for every job
//! validates the inputs, composes the output and appends exactly one run log
//! entry. Job-level failures are contained here and never stop the loop; the
//! only errors that leave [`MergeRunner::run`] are an unreadable manifest
//! (before any log exists) and a run log that cannot be written.
//!
//! # Examples
//!
//! ```no_run
//! use docmerge::config::Config;
//! use docmerge::context::RunContext;
//! use docmerge::runner::MergeRunner;
//!
//! # fn example() -> docmerge::Result<()> {
//! let config = Config::new("input", "output", "error", "input/jobs.xlsx");
//! let ctx = RunContext::from_config(&config);
//! let summary = MergeRunner::new(&ctx).run()?;
//! println!("{}/{} merged", summary.succeeded, summary.total);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::path::PathBuf;

use crate::context::RunContext;
use crate::error::{DocMergeError, Result};
use crate::logging::{LogEntry, Outcome, RunLogger};
use crate::manifest::{Manifest, ManifestReader, MergeJob, RejectedRow};
use crate::merge::{ComposeStatistics, DocumentComposer};
use crate::output::formatter::OutputFormatter;
use crate::output::progress::JobProgress;
use crate::utils::format_file_size;
use crate::validation::{JobValidator, ValidationResult};

/// What happened to one job.
#[derive(Debug)]
pub enum JobOutcome {
    /// Inputs were missing; nothing was composed.
    Skipped {
        /// Every missing source, in manifest order.
        missing: Vec<PathBuf>,
    },
    /// The output was written.
    Succeeded {
        /// Composition statistics.
        statistics: ComposeStatistics,
    },
    /// Composition failed.
    Failed {
        /// One-line description for the run log.
        message: String,
        /// Full diagnostic trace for the error log.
        trace: String,
    },
}

impl JobOutcome {
    /// Run log outcome for this job.
    pub fn outcome(&self) -> Outcome {
        match self {
            Self::Skipped { .. } => Outcome::MissingInputs,
            Self::Succeeded { .. } => Outcome::Success,
            Self::Failed { .. } => Outcome::MergeFailed,
        }
    }

    /// Run log detail for this job.
    pub fn detail(&self) -> String {
        match self {
            Self::Skipped { missing } => ValidationResult::Invalid {
                missing: missing.clone(),
            }
            .missing_list(),
            Self::Succeeded { .. } => String::new(),
            Self::Failed { message, .. } => message.clone(),
        }
    }
}

/// Totals of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Run id (start timestamp).
    pub run_id: String,
    /// Jobs processed.
    pub total: usize,
    /// Jobs whose output was written.
    pub succeeded: usize,
    /// Jobs skipped for missing inputs.
    pub skipped: usize,
    /// Jobs whose composition failed.
    pub failed: usize,
    /// Manifest rows that could not form a job.
    pub rejected_rows: usize,
    /// Run log path.
    pub log_path: PathBuf,
    /// Error log path, if any failure was recorded.
    pub error_log_path: Option<PathBuf>,
    /// Run log entries, in manifest order.
    pub entries: Vec<LogEntry>,
}

impl RunSummary {
    fn record(&mut self, entry: LogEntry) {
        self.total += 1;
        match entry.outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::MissingInputs => self.skipped += 1,
            Outcome::MergeFailed => self.failed += 1,
        }
        self.entries.push(entry);
    }

    /// Whether every job produced its output.
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// One job as a dry run sees it.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedJob {
    /// The job.
    pub job: MergeJob,
    /// Where its output would be written.
    pub destination: PathBuf,
    /// Input check result.
    pub validation: ValidationResult,
}

/// Everything a run would do, without doing it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunPlan {
    /// Jobs in manifest order.
    pub jobs: Vec<PlannedJob>,
    /// Manifest rows that could not form a job.
    pub rejected_rows: Vec<RejectedRow>,
}

impl RunPlan {
    /// Jobs whose inputs are all present.
    pub fn ready(&self) -> usize {
        self.jobs.iter().filter(|p| p.validation.is_valid()).count()
    }

    /// Jobs that would be skipped for missing inputs.
    pub fn blocked(&self) -> usize {
        self.jobs.len() - self.ready()
    }
}

/// Runs every job of a manifest.
pub struct MergeRunner<'a> {
    ctx: &'a RunContext,
    validator: JobValidator,
    composer: DocumentComposer,
    formatter: OutputFormatter,
}

impl<'a> MergeRunner<'a> {
    /// Create a runner for `ctx` that prints only warnings and errors.
    pub fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            validator: JobValidator::new(),
            composer: DocumentComposer::new(),
            formatter: OutputFormatter::quiet(),
        }
    }

    /// Use `formatter` for console output.
    pub fn with_formatter(mut self, formatter: OutputFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Process every job of the manifest.
    ///
    /// # Errors
    ///
    /// - [`DocMergeError::ManifestUnreadable`] before anything is written.
    /// - [`DocMergeError::LogWriteFailed`] if the run log cannot be created
    ///   or appended to.
    pub fn run(&self) -> Result<RunSummary> {
        let _span = tracing::info_span!("run", run_id = %self.ctx.run_id).entered();

        let manifest = self.load_manifest()?;
        let logger = RunLogger::open(self.ctx)?;

        let mut summary = RunSummary {
            run_id: self.ctx.run_id.clone(),
            rejected_rows: manifest.rejected_rows.len(),
            log_path: logger.log_path().to_path_buf(),
            ..Default::default()
        };

        tracing::info!(jobs = manifest.jobs.len(), "run started");
        let mut progress = JobProgress::new(manifest.jobs.len(), &self.formatter);

        for job in &manifest.jobs {
            progress.start(&job.output_name);

            let outcome = self.process_job(job);
            self.report(job, &outcome);

            let entry = LogEntry::new(&job.name, outcome.outcome(), outcome.detail());
            logger.record_entry(&entry)?;

            if let JobOutcome::Failed { trace, .. } = &outcome {
                let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                logger.record_error(&format!("[{stamp}] {trace}\n"))?;
                summary.error_log_path = Some(logger.error_log_path().to_path_buf());
            }

            summary.record(entry);
        }

        progress.finish();
        tracing::info!(
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed,
            "run finished"
        );

        Ok(summary)
    }

    /// Validate every job and report what a run would do. Writes nothing.
    pub fn plan(&self) -> Result<RunPlan> {
        let manifest = self.load_manifest()?;
        let output_dir = self.ctx.documents_output_dir();

        let jobs = manifest
            .jobs
            .into_iter()
            .map(|job| PlannedJob {
                destination: output_dir.join(&job.output_name),
                validation: self.validator.validate(&job),
                job,
            })
            .collect();

        Ok(RunPlan {
            jobs,
            rejected_rows: manifest.rejected_rows,
        })
    }

    /// Validate and compose one job. Never fails; every error becomes an
    /// outcome.
    pub fn process_job(&self, job: &MergeJob) -> JobOutcome {
        if let ValidationResult::Invalid { missing } = self.validator.validate(job) {
            tracing::warn!(job = %job.output_name, missing = missing.len(), "inputs missing");
            return JobOutcome::Skipped { missing };
        }

        let destination = self.ctx.documents_output_dir().join(&job.output_name);
        match self.composer.compose(&job.source_paths, &destination) {
            Ok(statistics) => {
                tracing::info!(job = %job.output_name, sources = statistics.sources_merged, "merged");
                JobOutcome::Succeeded { statistics }
            }
            Err(error) => {
                tracing::error!(job = %job.output_name, %error, "merge failed");
                failure(job, error)
            }
        }
    }

    fn load_manifest(&self) -> Result<Manifest> {
        let manifest = ManifestReader::new(self.ctx).read(&self.ctx.manifest_path)?;

        for rejected in &manifest.rejected_rows {
            self.formatter.warning(&format!(
                "Manifest row {} ignored: {}",
                rejected.row, rejected.reason
            ));
        }

        Ok(manifest)
    }

    fn report(&self, job: &MergeJob, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Succeeded { statistics } => {
                self.formatter.success(&format!(
                    "{} ({} source(s), {})",
                    job.output_name,
                    statistics.sources_merged,
                    format_file_size(statistics.output_size)
                ));
                for source in &job.source_paths {
                    self.formatter.detail("source", &source.display().to_string());
                }
                self.formatter
                    .detail("output", &statistics.output_path.display().to_string());
                self.formatter.debug(&format!(
                    "{} composed in {:.2?}",
                    job.output_name, statistics.compose_time
                ));
            }
            JobOutcome::Skipped { .. } => {
                self.formatter.warning(&format!(
                    "{}: missing input(s): {}",
                    job.output_name,
                    outcome.detail()
                ));
            }
            JobOutcome::Failed { message, .. } => {
                self.formatter
                    .error(&format!("{}: merge failed: {message}", job.output_name));
            }
        }
    }
}

fn failure(job: &MergeJob, error: DocMergeError) -> JobOutcome {
    let message = error
        .to_string()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let trace = anyhow::Error::new(error).context(format!(
        "{} (manifest row {}) could not be merged from {} source(s)",
        job.output_name,
        job.row,
        job.source_paths.len()
    ));

    JobOutcome::Failed {
        message,
        trace: format!("{trace:?}"),
    }
}
