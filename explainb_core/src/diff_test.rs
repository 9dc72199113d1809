use crate::classify::{Status, classify};
use crate::diff::{DiffKind, compare_plans, materialize};
use crate::error::CompareError;
use crate::explain::ExplainResult;
use crate::matcher::align;

fn ok_result(index: usize, plan: &str) -> ExplainResult {
    let mut result = ExplainResult::succeeded("select 1", plan.to_string(), 0.5, "DSN1");
    result.query_index = index;
    result
}

fn err_result(index: usize, message: &str) -> ExplainResult {
    let mut result = ExplainResult::failed("select 1", message.to_string(), 60.0, "DSN2");
    result.query_index = index;
    result
}

#[test]
fn identical_plans_compare_as_identical() {
    let left = ok_result(1, "Scan(t1)\nFilter(x>1)\n");
    let right = ok_result(1, "Scan(t1)\nFilter(x>1)\n");
    let comparison = compare_plans(left, right, None).unwrap();

    assert!(comparison.is_identical);
    assert_eq!(comparison.similarity_score, 1.0);
    assert_eq!(classify(&comparison), Status::Identical);
    assert_eq!(comparison.diff_lines.len(), 2);
    for (row, expected) in comparison.diff_lines.iter().zip(1usize..) {
        assert_eq!(row.kind, DiffKind::Equal);
        assert_eq!(row.left_line_num, Some(expected));
        assert_eq!(row.right_line_num, Some(expected));
        assert_eq!(row.left_content, row.right_content);
    }
}

#[test]
fn volatile_fields_do_not_break_identity() {
    let left = ok_result(1, "Scan(t1) session_id: aaa\nFilter(x>1)");
    let right = ok_result(1, "Scan(t1) session_id: bbb\nFilter(x>1)");
    let comparison = compare_plans(left, right, None).unwrap();
    assert!(comparison.is_identical);
    assert_eq!(classify(&comparison), Status::Identical);
}

#[test]
fn trailing_insert_is_classified_different() {
    let left = ok_result(3, "Scan(t1)");
    let right = ok_result(3, "Scan(t1)\nProject(a,b)");
    let comparison = compare_plans(left, right, None).unwrap();

    assert!(!comparison.is_identical);
    assert!((comparison.similarity_score - 2.0 / 3.0).abs() < 1e-12);
    assert_eq!(classify(&comparison), Status::Different);

    assert_eq!(comparison.diff_lines.len(), 2);
    assert_eq!(comparison.diff_lines[0].kind, DiffKind::Equal);
    assert_eq!(comparison.diff_lines[1].kind, DiffKind::Insert);
    assert_eq!(comparison.diff_lines[1].left_line_num, None);
    assert_eq!(comparison.diff_lines[1].right_line_num, Some(2));
}

#[test]
fn similarity_just_above_threshold_is_similar() {
    // 9 shared lines plus one insert: 18/19 > 0.8.
    let shared: Vec<String> = (0..9).map(|n| format!("Op{n}")).collect();
    let left = ok_result(1, &shared.join("\n"));
    let right = ok_result(1, &format!("{}\nExtra", shared.join("\n")));
    let comparison = compare_plans(left, right, None).unwrap();
    assert_eq!(classify(&comparison), Status::Similar);
}

#[test]
fn similarity_exactly_at_threshold_is_different() {
    // 2 shared lines, right has one more: 2*2/(2+3) == 0.8 exactly.
    let left = ok_result(1, "a\nb");
    let right = ok_result(1, "a\nb\nc");
    let comparison = compare_plans(left, right, None).unwrap();
    assert_eq!(comparison.similarity_score, 0.8);
    assert_eq!(classify(&comparison), Status::Different);
}

#[test]
fn failed_side_dominates_as_error_and_renders_survivor_as_insert() {
    let left = err_result(7, "Query timeout after 60 seconds");
    let right = ok_result(7, "Scan(t1)\nFilter(x>1)");
    let comparison = compare_plans(left, right, None).unwrap();

    assert_eq!(classify(&comparison), Status::Error);
    assert_eq!(comparison.similarity_score, 0.0);
    assert!(!comparison.is_identical);
    assert_eq!(comparison.left_summary.error_message, "Query timeout after 60 seconds");

    // The surviving side still shows up, as all-insert rows.
    assert_eq!(comparison.diff_lines.len(), 2);
    assert!(comparison.diff_lines.iter().all(|row| row.kind == DiffKind::Insert));
    assert!(comparison.diff_lines.iter().all(|row| row.left_line_num.is_none()));
}

#[test]
fn both_sides_failed_yields_empty_diff() {
    let left = err_result(2, "connection refused");
    let right = err_result(2, "connection refused");
    let comparison = compare_plans(left, right, None).unwrap();
    assert_eq!(classify(&comparison), Status::Error);
    assert!(comparison.diff_lines.is_empty());
}

#[test]
fn mismatched_query_index_is_rejected() {
    let left = ok_result(1, "Scan(t1)");
    let right = ok_result(2, "Scan(t1)");
    let err = compare_plans(left, right, None).unwrap_err();
    assert!(matches!(
        err,
        CompareError::QueryIndexMismatch { left: 1, right: 2 }
    ));
}

#[test]
fn mismatched_reference_index_is_rejected() {
    let left = ok_result(4, "Scan(t1)");
    let right = ok_result(4, "Scan(t1)");
    let reference = ok_result(5, "Scan(t1)");
    let err = compare_plans(left, right, Some(reference)).unwrap_err();
    assert!(matches!(
        err,
        CompareError::ReferenceIndexMismatch {
            reference: 5,
            expected: 4
        }
    ));
}

#[test]
fn ragged_replace_degrades_missing_side_rows() {
    // Replace region: 1 left line vs 3 right lines.
    let left: Vec<String> = ["same", "old"].iter().map(|s| s.to_string()).collect();
    let right: Vec<String> = ["same", "new1", "new2", "new3"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let alignment = align(&left, &right);
    let rows = materialize(&left, &right, &alignment.opcodes);

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].kind, DiffKind::Equal);
    assert_eq!(rows[1].kind, DiffKind::Replace);
    assert_eq!(rows[1].left_line_num, Some(2));
    assert_eq!(rows[1].right_line_num, Some(2));
    assert_eq!(rows[2].kind, DiffKind::Insert);
    assert_eq!(rows[2].left_line_num, None);
    assert_eq!(rows[2].right_line_num, Some(3));
    assert_eq!(rows[3].kind, DiffKind::Insert);
    assert_eq!(rows[3].right_line_num, Some(4));
}

#[test]
fn line_number_counts_match_sequence_lengths() {
    let left: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
    let right: Vec<String> = ["a", "x", "y", "d", "e"].iter().map(|s| s.to_string()).collect();
    let alignment = align(&left, &right);
    let rows = materialize(&left, &right, &alignment.opcodes);

    let left_rows = rows.iter().filter(|r| r.left_line_num.is_some()).count();
    let right_rows = rows.iter().filter(|r| r.right_line_num.is_some()).count();
    assert_eq!(left_rows, left.len());
    assert_eq!(right_rows, right.len());
}
