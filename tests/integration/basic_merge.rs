//! Integration tests for complete merge runs.

use docmerge::MergeRunner;
use docmerge::config::LogFormat;
use docmerge::logging::Outcome;
use std::fs;

use crate::common::{Workspace, page_breaks, positions};

#[test]
fn test_merge_two_sources_and_skip_missing() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.source("y.docx", "why");
    ws.csv_manifest("A,x.docx,y.docx\nB,z.docx\n");

    let (ctx, summary) = ws.run();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.skipped, 1);

    let xml = ws.output_xml("A.docx");
    let order = positions(&xml, &["ex", "why"]);
    assert!(order[0] < order[1]);
    assert_eq!(page_breaks(&xml), 2);

    assert!(!ws.output("B.docx").exists());

    let lines = ws.log_lines(&ctx);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "A Success");
    assert!(lines[1].starts_with("B MissingInputs ("));
    assert!(lines[1].contains("z.docx"));
}

#[test]
fn test_single_source_gets_page_break() {
    let ws = Workspace::new();
    ws.source("x.docx", "only");
    ws.csv_manifest("Solo,x.docx\n");

    ws.run();

    let xml = ws.output_xml("Solo.docx");
    assert!(xml.contains(">only<"));
    assert_eq!(page_breaks(&xml), 1);
}

#[test]
fn test_source_order_follows_manifest() {
    let ws = Workspace::new();
    for name in ["c", "a", "b"] {
        ws.source(&format!("{name}.docx"), &format!("text-{name}"));
    }
    ws.csv_manifest("Out,c.docx,a.docx,b.docx\n");

    ws.run();

    let xml = ws.output_xml("Out.docx");
    let order = positions(&xml, &["text-c", "text-a", "text-b"]);
    assert!(order[0] < order[1] && order[1] < order[2]);
    assert_eq!(page_breaks(&xml), 3);
}

#[test]
fn test_every_entry_logged_in_manifest_order() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest("One,x.docx\nTwo,missing.docx\nThree,x.docx,x.docx\n");

    let (ctx, summary) = ws.run();

    let jobs: Vec<&str> = summary.entries.iter().map(|e| e.job.as_str()).collect();
    assert_eq!(jobs, vec!["One", "Two", "Three"]);
    assert_eq!(ws.log_lines(&ctx).len(), 3);
    assert_eq!(summary.entries[2].outcome, Outcome::Success);
}

#[test]
fn test_sources_in_subfolders_and_blank_cells() {
    let ws = Workspace::new();
    ws.source("chapters/one.docx", "first");
    ws.source("two.docx", "second");
    ws.csv_manifest("Book,,chapters/one.docx,,two.docx\n");

    let (_, summary) = ws.run();

    assert_eq!(summary.succeeded, 1);
    let xml = ws.output_xml("Book.docx");
    let order = positions(&xml, &["first", "second"]);
    assert!(order[0] < order[1]);
}

#[test]
fn test_output_name_with_extension_kept() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest("Report.docx,x.docx\n");

    ws.run();

    assert!(ws.output("Report.docx").exists());
    assert!(!ws.output("Report.docx.docx").exists());
}

#[test]
fn test_existing_output_overwritten() {
    let ws = Workspace::new();
    ws.source("x.docx", "fresh");
    ws.csv_manifest("A,x.docx\n");
    fs::create_dir_all(ws.output("")).unwrap();
    fs::write(ws.output("A.docx"), "stale").unwrap();

    ws.run();

    assert!(ws.output_xml("A.docx").contains(">fresh<"));
}

#[test]
fn test_xlsx_manifest() {
    let mut ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.source("y.docx", "why");
    ws.xlsx_manifest(&[&["A", "x.docx", "y.docx"], &["B", "", "x.docx"]]);

    let (_, summary) = ws.run();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert!(ws.output("A.docx").exists());
    assert!(ws.output("B.docx").exists());
}

#[test]
fn test_json_run_log() {
    let mut ws = Workspace::new();
    ws.config.log_format = LogFormat::Json;
    ws.source("x.docx", "ex");
    ws.csv_manifest("A,x.docx\nB,gone.docx\n");

    let (ctx, _) = ws.run();

    assert_eq!(ctx.log_path.extension().unwrap(), "jsonl");
    let lines = ws.log_lines(&ctx);
    let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(first["outcome"], "Success");
    assert_eq!(second["outcome"], "MissingInputs");
}

#[test]
fn test_log_named_after_run_id() {
    let ws = Workspace::new();
    ws.csv_manifest("");

    let (ctx, _) = ws.run();

    let name = ctx.log_path.file_name().unwrap().to_str().unwrap().to_string();
    assert_eq!(name, format!("log_{}.txt", ctx.run_id));
    assert_eq!(ctx.run_id.len(), 14);
    assert!(ws.root().join("output").join(&name).exists());
}

#[test]
fn test_runs_in_same_second_keep_separate_logs() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest("A,x.docx\nB,gone.docx\n");

    let ctx = ws.context();
    let first = MergeRunner::new(&ctx).run().unwrap();
    let second = MergeRunner::new(&ctx).run().unwrap();

    assert_ne!(first.log_path, second.log_path);
    for summary in [&first, &second] {
        let log = fs::read_to_string(&summary.log_path).unwrap();
        assert_eq!(log.lines().count(), 2);
    }
}
