//! Integration tests for dry-run planning.

use docmerge::MergeRunner;
use docmerge::validation::ValidationResult;

use crate::common::Workspace;

#[test]
fn test_plan_reports_without_writing() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest("A,x.docx\nB,x.docx,gone.docx\n");

    let ctx = ws.context();
    let plan = MergeRunner::new(&ctx).plan().unwrap();

    assert_eq!(plan.jobs.len(), 2);
    assert_eq!(plan.ready(), 1);
    assert_eq!(plan.blocked(), 1);
    assert!(plan.jobs[0].validation.is_valid());
    assert!(matches!(
        &plan.jobs[1].validation,
        ValidationResult::Invalid { missing } if missing.len() == 1
    ));

    assert!(!ctx.log_path.exists());
    assert!(!ws.config.output_dir.exists());
    assert!(!ws.config.error_dir.exists());
}

#[test]
fn test_plan_destinations_under_output_docx() {
    let ws = Workspace::new();
    ws.source("x.docx", "ex");
    ws.csv_manifest("Report,x.docx\n");

    let ctx = ws.context();
    let plan = MergeRunner::new(&ctx).plan().unwrap();

    assert_eq!(plan.jobs[0].destination, ws.output("Report.docx"));
}

#[test]
fn test_plan_serializes() {
    let ws = Workspace::new();
    ws.csv_manifest("A,gone.docx\n,orphan.docx\n");

    let ctx = ws.context();
    let plan = MergeRunner::new(&ctx).plan().unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["jobs"][0]["job"]["name"], "A");
    assert_eq!(json["jobs"][0]["job"]["output_name"], "A.docx");
    assert_eq!(json["jobs"][0]["validation"]["status"], "invalid");
    assert_eq!(json["rejected_rows"][0]["row"], 2);
}
