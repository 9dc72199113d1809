//! Report payload assembly: aggregate statistics plus the ordered
//! per-query section the renderer consumes. Field names here are the wire
//! contract with the renderer.

use serde::Serialize;

use crate::classify::{Status, classify};
use crate::diff::{ComparisonResult, DiffLine, EngineSummary};
use crate::explain::ExplainResult;

/// Free-form run metadata; the assembler passes it through without
/// validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportMeta {
    pub title: String,
    pub generation_time: String,
    pub left_label: String,
    pub right_label: String,
    pub left_version: String,
    pub right_version: String,
    pub left_warehouse: String,
    pub left_database: String,
    pub right_warehouse: String,
    pub right_database: String,
    pub reference_version: String,
    pub sql_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_queries: usize,
    pub identical_count: usize,
    pub similar_count: usize,
    pub different_count: usize,
    pub error_count: usize,
    pub avg_similarity: f64,
}

/// One engine's plan/error block inside a query payload.
#[derive(Debug, Clone, Serialize)]
pub struct EngineResult {
    pub success: bool,
    pub plan_text: String,
    pub error_message: String,
    pub elapsed_seconds: f64,
}

impl EngineResult {
    fn of(result: &ExplainResult) -> Self {
        Self {
            success: result.success,
            plan_text: result.plan_text.clone(),
            error_message: result.error_message.clone(),
            elapsed_seconds: result.elapsed_seconds,
        }
    }

    fn absent() -> Self {
        Self {
            success: false,
            plan_text: String::new(),
            error_message: String::new(),
            elapsed_seconds: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiffBlock {
    pub left_info: EngineSummary,
    pub right_info: EngineSummary,
    pub diff_lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query_index: usize,
    pub sql_query: String,
    pub short_sql: String,
    pub status: Status,
    pub similarity_score: f64,
    pub is_identical: bool,
    pub left_result: EngineResult,
    pub right_result: EngineResult,
    pub reference_result: EngineResult,
    pub diff: DiffBlock,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub meta: ReportMeta,
    pub statistics: Statistics,
    pub query_results: Vec<QueryResult>,
}

/// Counts per classifier outcome plus the mean similarity; an empty input
/// yields zero counts and a 0.0 average rather than a division error.
pub fn compute_statistics(comparisons: &[ComparisonResult]) -> Statistics {
    let mut stats = Statistics {
        total_queries: comparisons.len(),
        ..Statistics::default()
    };
    for comparison in comparisons {
        match classify(comparison) {
            Status::Identical => stats.identical_count += 1,
            Status::Similar => stats.similar_count += 1,
            Status::Different => stats.different_count += 1,
            Status::Error => stats.error_count += 1,
        }
    }
    if !comparisons.is_empty() {
        let sum: f64 = comparisons.iter().map(|c| c.similarity_score).sum();
        stats.avg_similarity = sum / comparisons.len() as f64;
    }
    stats
}

/// Build the serializable report payload from the completed comparisons.
pub fn assemble(comparisons: &[ComparisonResult], meta: ReportMeta) -> ReportData {
    let query_results = comparisons
        .iter()
        .map(|comparison| QueryResult {
            query_index: comparison.query_index,
            sql_query: comparison.sql_query.clone(),
            short_sql: comparison.short_sql(),
            status: classify(comparison),
            similarity_score: comparison.similarity_score,
            is_identical: comparison.is_identical,
            left_result: EngineResult::of(&comparison.left_result),
            right_result: EngineResult::of(&comparison.right_result),
            reference_result: comparison
                .reference_result
                .as_ref()
                .map(EngineResult::of)
                .unwrap_or_else(EngineResult::absent),
            diff: DiffBlock {
                left_info: comparison.left_summary.clone(),
                right_info: comparison.right_summary.clone(),
                diff_lines: comparison.diff_lines.clone(),
            },
        })
        .collect();

    ReportData {
        meta,
        statistics: compute_statistics(comparisons),
        query_results,
    }
}
