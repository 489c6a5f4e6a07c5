//! Integration tests for error handling and edge cases.

use docmerge::cli::Cli;
use docmerge::error::DocMergeError;
use docmerge::logging::Outcome;
use docmerge::{MergeRunner, RunContext};
use clap::Parser;
use std::fs;

use crate::common::Workspace;

#[test]
fn test_empty_manifest_writes_empty_log() {
    let ws = Workspace::new();
    ws.csv_manifest("");

    let (ctx, summary) = ws.run();

    assert_eq!(summary.total, 0);
    assert!(ctx.log_path.exists());
    assert!(ws.log_lines(&ctx).is_empty());
    assert!(!ctx.error_log_path.exists());
}

#[test]
fn test_missing_manifest_is_fatal() {
    let ws = Workspace::new();

    let ctx = ws.context();
    let err = MergeRunner::new(&ctx).run().unwrap_err();

    assert!(matches!(err, DocMergeError::ManifestUnreadable { .. }));
    assert!(err.is_fatal());
    assert_eq!(err.exit_code(), 2);
    assert!(!ctx.log_path.exists());
}

#[test]
fn test_corrupt_source_does_not_stop_run() {
    let ws = Workspace::new();
    ws.corrupt_source("broken.docx");
    ws.source("x.docx", "ex");
    ws.csv_manifest("Bad,x.docx,broken.docx\nGood,x.docx\n");

    let (ctx, summary) = ws.run();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, 1);
    assert!(!ws.output("Bad.docx").exists());
    assert!(ws.output("Good.docx").exists());

    let lines = ws.log_lines(&ctx);
    assert!(lines[0].starts_with("Bad MergeFailed"));
    assert_eq!(lines[1], "Good Success");

    let error_log = fs::read_to_string(&ctx.error_log_path).unwrap();
    assert!(error_log.contains("Bad.docx"));
    assert!(error_log.contains("broken.docx"));
    assert_eq!(
        ctx.error_log_path.file_name().unwrap().to_str().unwrap(),
        format!("error_{}.txt", ctx.run_id)
    );
}

#[test]
fn test_every_missing_source_reported() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest("A,gone1.docx,x.docx,gone2.docx\n");

    let (_, summary) = ws.run();

    let entry = &summary.entries[0];
    assert_eq!(entry.outcome, Outcome::MissingInputs);
    let first = entry.detail.find("gone1.docx").unwrap();
    let second = entry.detail.find("gone2.docx").unwrap();
    assert!(first < second);
    assert!(!entry.detail.contains("x.docx"));
}

#[test]
fn test_duplicate_output_names_last_wins() {
    let ws = Workspace::new();
    ws.source("x.docx", "first-run");
    ws.source("y.docx", "second-run");
    ws.csv_manifest("A,x.docx\nA,y.docx\n");

    let (ctx, _) = ws.run();

    assert_eq!(ws.log_lines(&ctx).len(), 2);
    let xml = ws.output_xml("A.docx");
    assert!(xml.contains(">second-run<"));
    assert!(!xml.contains(">first-run<"));
}

#[test]
fn test_row_without_name_is_not_a_job() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest(",x.docx\nA,x.docx\n");

    let (ctx, summary) = ws.run();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.rejected_rows, 1);
    assert_eq!(ws.log_lines(&ctx), vec!["A Success".to_string()]);
}

#[test]
fn test_job_without_sources_logs_failure() {
    let ws = Workspace::new();
    ws.csv_manifest("Lonely\n");

    let (ctx, summary) = ws.run();

    assert_eq!(summary.failed, 1);
    assert!(ws.log_lines(&ctx)[0].starts_with("Lonely MergeFailed"));
    assert!(ctx.error_log_path.exists());
}

#[test]
fn test_unsupported_manifest_type() {
    let mut ws = Workspace::new();
    let path = ws.config.input_dir.join("jobs.txt");
    fs::write(&path, "A,x.docx\n").unwrap();
    ws.config.manifest = path;

    let ctx = RunContext::from_config(&ws.config);
    let err = MergeRunner::new(&ctx).run().unwrap_err();
    assert!(matches!(err, DocMergeError::ManifestUnreadable { .. }));
}

#[test]
fn test_cli_without_manifest_reports_not_found() {
    let ws = Workspace::new();
    let input = ws.config.input_dir.to_str().unwrap().to_string();

    let cli = Cli::try_parse_from(["docmerge", "-i", input.as_str()]).unwrap();
    let err = cli.to_config().unwrap_err();

    assert!(matches!(err, DocMergeError::ManifestNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_cli_same_input_and_output_rejected() {
    let ws = Workspace::new();
    ws.csv_manifest("");
    let input = ws.config.input_dir.to_str().unwrap().to_string();

    let cli = Cli::try_parse_from(["docmerge", "-i", input.as_str(), "-o", input.as_str()]).unwrap();
    let err = cli.to_config().unwrap_err();

    assert!(matches!(err, DocMergeError::InvalidConfig { .. }));
    assert_eq!(err.exit_code(), 1);
}
