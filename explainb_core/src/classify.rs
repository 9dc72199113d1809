//! Four-way comparison status, recomputed on demand from already-computed
//! fields rather than stored, so it can never go stale.

use serde::Serialize;

use crate::diff::ComparisonResult;

/// Threshold above which (strictly) a non-identical pair counts as
/// similar.
pub const SIMILAR_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Error,
    Identical,
    Similar,
    Different,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Error => "ERROR",
            Status::Identical => "IDENTICAL",
            Status::Similar => "SIMILAR",
            Status::Different => "DIFFERENT",
        }
    }
}

/// Execution failure on either side dominates content comparison.
pub fn classify(comparison: &ComparisonResult) -> Status {
    if !comparison.left_result.success || !comparison.right_result.success {
        Status::Error
    } else if comparison.is_identical {
        Status::Identical
    } else if comparison.similarity_score > SIMILAR_THRESHOLD {
        Status::Similar
    } else {
        Status::Different
    }
}
