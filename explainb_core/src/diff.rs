//! Diff materialization: turns an edit script into the annotated,
//! line-numbered rows a side-by-side renderer consumes, and bundles the
//! whole comparison for one query into a `ComparisonResult`.

use serde::Serialize;

use crate::error::CompareError;
use crate::explain::ExplainResult;
use crate::matcher::{self, Opcode};
use crate::normalize::normalize_plan;

/// Row kind, serialized lowercase under the wire name `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// One row of the rendered diff. Line numbers are 1-based within each
/// side's normalized sequence; `None` means that side has no line on this
/// row, which renderers show as a blank gutter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: DiffKind,
    pub left_line_num: Option<usize>,
    pub right_line_num: Option<usize>,
    pub left_content: String,
    pub right_content: String,
}

/// Per-side execution summary carried alongside the diff rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSummary {
    pub name: String,
    pub success: bool,
    pub elapsed_seconds: f64,
    pub error_message: String,
}

impl EngineSummary {
    fn of(result: &ExplainResult) -> Self {
        Self {
            name: result.engine_name.clone(),
            success: result.success,
            elapsed_seconds: result.elapsed_seconds,
            error_message: if result.success {
                String::new()
            } else {
                result.error_message.clone()
            },
        }
    }
}

/// Outcome of comparing two engines' results for one query, immutable once
/// built.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub query_index: usize,
    pub sql_query: String,
    pub left_result: ExplainResult,
    pub right_result: ExplainResult,
    pub reference_result: Option<ExplainResult>,
    pub is_identical: bool,
    pub similarity_score: f64,
    pub left_summary: EngineSummary,
    pub right_summary: EngineSummary,
    pub diff_lines: Vec<DiffLine>,
}

impl ComparisonResult {
    pub fn short_sql(&self) -> String {
        crate::explain::shorten_sql(&self.sql_query)
    }
}

/// Walk the edit script and emit one `DiffLine` per rendered row, keeping
/// an independent 1-based counter per side.
pub fn materialize(left: &[String], right: &[String], opcodes: &[Opcode]) -> Vec<DiffLine> {
    let mut rows: Vec<DiffLine> = vec![];
    let mut left_num = 1usize;
    let mut right_num = 1usize;

    for op in opcodes {
        match *op {
            Opcode::Equal { i1, i2, j1, .. } => {
                for idx in 0..(i2 - i1) {
                    rows.push(DiffLine {
                        kind: DiffKind::Equal,
                        left_line_num: Some(left_num + idx),
                        right_line_num: Some(right_num + idx),
                        left_content: left[i1 + idx].clone(),
                        right_content: right[j1 + idx].clone(),
                    });
                }
                left_num += i2 - i1;
                right_num += i2 - i1;
            }
            Opcode::Delete { i1, i2 } => {
                for idx in 0..(i2 - i1) {
                    rows.push(DiffLine {
                        kind: DiffKind::Delete,
                        left_line_num: Some(left_num + idx),
                        right_line_num: None,
                        left_content: left[i1 + idx].clone(),
                        right_content: String::new(),
                    });
                }
                left_num += i2 - i1;
            }
            Opcode::Insert { j1, j2 } => {
                for idx in 0..(j2 - j1) {
                    rows.push(DiffLine {
                        kind: DiffKind::Insert,
                        left_line_num: None,
                        right_line_num: Some(right_num + idx),
                        left_content: String::new(),
                        right_content: right[j1 + idx].clone(),
                    });
                }
                right_num += j2 - j1;
            }
            Opcode::Replace { i1, i2, j1, j2 } => {
                let left_len = i2 - i1;
                let right_len = j2 - j1;
                for idx in 0..left_len.max(right_len) {
                    let has_left = idx < left_len;
                    let has_right = idx < right_len;
                    let kind = match (has_left, has_right) {
                        (true, true) => DiffKind::Replace,
                        (true, false) => DiffKind::Delete,
                        (false, true) => DiffKind::Insert,
                        (false, false) => unreachable!("replace opcode with empty ranges"),
                    };
                    rows.push(DiffLine {
                        kind,
                        left_line_num: has_left.then(|| left_num + idx),
                        right_line_num: has_right.then(|| right_num + idx),
                        left_content: has_left.then(|| left[i1 + idx].clone()).unwrap_or_default(),
                        right_content: has_right.then(|| right[j1 + idx].clone()).unwrap_or_default(),
                    });
                }
                // Counters jump to the end of the consumed ranges, not
                // row-by-row.
                left_num += left_len;
                right_num += right_len;
            }
        }
    }
    rows
}

/// Compare two engines' results for the same query, with an optional
/// read-only reference attached for display.
///
/// When either side failed: similarity is 0.0, `is_identical` is false,
/// and the surviving side (if any) is still normalized and materialized so
/// the report shows its plan as all-insert or all-delete rows rather than
/// an empty diff.
pub fn compare_plans(
    left: ExplainResult,
    right: ExplainResult,
    reference: Option<ExplainResult>,
) -> Result<ComparisonResult, CompareError> {
    if left.query_index != right.query_index {
        return Err(CompareError::QueryIndexMismatch {
            left: left.query_index,
            right: right.query_index,
        });
    }
    if let Some(r) = &reference {
        if r.query_index != left.query_index {
            return Err(CompareError::ReferenceIndexMismatch {
                reference: r.query_index,
                expected: left.query_index,
            });
        }
    }

    let left_lines = if left.success {
        normalize_plan(&left.plan_text)
    } else {
        vec![]
    };
    let right_lines = if right.success {
        normalize_plan(&right.plan_text)
    } else {
        vec![]
    };

    let both_ok = left.success && right.success;
    let alignment = matcher::align(&left_lines, &right_lines);
    let diff_lines = materialize(&left_lines, &right_lines, &alignment.opcodes);

    Ok(ComparisonResult {
        query_index: left.query_index,
        sql_query: left.sql_query.clone(),
        is_identical: both_ok && left_lines == right_lines,
        similarity_score: if both_ok { alignment.ratio } else { 0.0 },
        left_summary: EngineSummary::of(&left),
        right_summary: EngineSummary::of(&right),
        left_result: left,
        right_result: right,
        reference_result: reference,
        diff_lines,
    })
}
