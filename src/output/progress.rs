//! Per-job progress reporting.
//!
//! Prints one `[current/total] job` line as each job starts, and a closing
//! line with the elapsed time.
//!
//! # Examples
//!
//! ```
//! use docmerge::output::progress::JobProgress;
//!
//! let mut progress = JobProgress::disabled(3);
//! progress.start("report.docx");
//! assert_eq!(progress.current(), 1);
//! ```

use std::time::{Duration, Instant};

use crate::output::formatter::OutputFormatter;

/// Counter over the jobs of one run.
#[derive(Debug)]
pub struct JobProgress {
    total: usize,
    current: usize,
    start_time: Instant,
    enabled: bool,
}

impl JobProgress {
    /// Progress for `total` jobs, printed unless the formatter is quiet.
    pub fn new(total: usize, formatter: &OutputFormatter) -> Self {
        Self {
            total,
            current: 0,
            start_time: Instant::now(),
            enabled: formatter.should_print(),
        }
    }

    /// Progress that counts but never prints.
    pub fn disabled(total: usize) -> Self {
        Self {
            total,
            current: 0,
            start_time: Instant::now(),
            enabled: false,
        }
    }

    /// Mark the next job as started.
    pub fn start(&mut self, job: &str) {
        self.current = (self.current + 1).min(self.total.max(1));
        if self.enabled {
            println!("{}", self.line(job));
        }
    }

    /// Print the closing line.
    pub fn finish(&self) {
        if self.enabled {
            println!(
                "Processed {}/{} job(s) in {}",
                self.current,
                self.total,
                format_duration(self.elapsed())
            );
        }
    }

    /// Line for the current job.
    pub fn line(&self, job: &str) -> String {
        let width = self.total.to_string().len();
        format!("[{:>width$}/{}] {job}", self.current, self.total)
    }

    /// Jobs started so far.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Total jobs.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Time since the first job was counted.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Format a duration as a human-readable string.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
