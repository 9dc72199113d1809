use explainb_core::diff::compare_plans;
use explainb_core::explain::ExplainResult;
use explainb_core::report::{ReportMeta, assemble};
use tempfile::TempDir;

use explainb::render::{render_report, write_report};

fn comparison(
    index: usize,
    left_plan: &str,
    right_plan: &str,
) -> explainb_core::diff::ComparisonResult {
    let mut left = ExplainResult::succeeded("select 1", left_plan.to_string(), 0.1, "DSN1");
    left.query_index = index;
    let mut right = ExplainResult::succeeded("select 1", right_plan.to_string(), 0.1, "DSN2");
    right.query_index = index;
    compare_plans(left, right, None).unwrap()
}

#[test]
fn rendered_report_embeds_the_json_payload() {
    let comparisons = vec![comparison(1, "Scan(t1)", "Scan(t1)\nProject(a)")];
    let report = assemble(
        &comparisons,
        ReportMeta {
            title: "Explain Plan Comparison Report".to_string(),
            sql_file: "q.sql".to_string(),
            ..ReportMeta::default()
        },
    );
    let html = render_report(&report);

    assert!(!html.contains("{report_data}"));
    assert!(html.contains("\"query_results\""));
    assert!(html.contains("\"total_queries\": 1"));
    assert!(html.contains("const reportData ="));
}

#[test]
fn write_report_creates_the_output_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.html");
    let report = assemble(&[], ReportMeta::default());
    write_report(&path, &report).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("<!DOCTYPE html>"));
    assert!(written.contains("\"total_queries\": 0"));
}
