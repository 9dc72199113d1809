use explainb_core::classify::{Status, classify};
use explainb_core::diff::{DiffKind, compare_plans};
use explainb_core::explain::ExplainResult;
use explainb_core::report::{ReportMeta, assemble};
use similar_asserts::assert_eq;

fn result_for(index: usize, engine: &str, plan: &str) -> ExplainResult {
    let mut result =
        ExplainResult::succeeded("select * from t1 where x > 1", plan.to_string(), 0.2, engine);
    result.query_index = index;
    result
}

const LEFT_PLAN: &str = "\
EvalScalar
├── scalars: [t1.a]
├── session_id: f00dcafe
├── Filter
│   ├── filters: [gt(t1.x, 1)]
│   └── TableScan
│       ├── table: default.t1
│       └── query_id: aaa111
";

const RIGHT_PLAN: &str = "\
EvalScalar
├── scalars: [t1.a]
├── session_id: deadbeef
├── Filter
│   ├── filters: [gt(t1.x, 1)]
│   └── TableScan
│       ├── table: default.t1
│       └── query_id: bbb222
";

#[test]
fn noisy_but_equal_plans_report_identical() {
    let comparison = compare_plans(
        result_for(1, "DSN1", LEFT_PLAN),
        result_for(1, "DSN2", RIGHT_PLAN),
        None,
    )
    .unwrap();

    assert_eq!(classify(&comparison), Status::Identical);
    assert_eq!(comparison.similarity_score, 1.0);
    assert!(comparison.diff_lines.iter().all(|r| r.kind == DiffKind::Equal));

    // Equal rows keep matching numbers on both sides.
    for row in &comparison.diff_lines {
        assert_eq!(row.left_line_num, row.right_line_num);
    }
}

#[test]
fn real_divergence_survives_normalization() {
    let changed = RIGHT_PLAN.replace("gt(t1.x, 1)", "ge(t1.x, 1)");
    let comparison = compare_plans(
        result_for(1, "DSN1", LEFT_PLAN),
        result_for(1, "DSN2", &changed),
        None,
    )
    .unwrap();

    assert!(!comparison.is_identical);
    assert!(comparison.similarity_score < 1.0);
    assert!(
        comparison
            .diff_lines
            .iter()
            .any(|r| r.kind == DiffKind::Replace)
    );
}

#[test]
fn assembled_report_round_trips_through_json() {
    let comparison = compare_plans(
        result_for(1, "DSN1", LEFT_PLAN),
        result_for(1, "DSN2", RIGHT_PLAN),
        Some(result_for(1, "Snowflake", "GlobalStats\nScan t1")),
    )
    .unwrap();
    let report = assemble(
        &[comparison],
        ReportMeta {
            title: "Explain Plan Comparison Report".to_string(),
            sql_file: "sql/tpcds.sql".to_string(),
            ..ReportMeta::default()
        },
    );

    let json = serde_json::to_string_pretty(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["meta"]["sql_file"], "sql/tpcds.sql");
    assert_eq!(value["statistics"]["identical_count"], 1);
    assert_eq!(
        value["query_results"][0]["reference_result"]["plan_text"],
        "GlobalStats\nScan t1"
    );
}
