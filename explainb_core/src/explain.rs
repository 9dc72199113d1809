//! Per-engine outcome of one EXPLAIN attempt.

const SHORT_SQL_MAX: usize = 80;
const SHORT_SQL_KEEP: usize = 77;

/// One engine's result for one query. `query_index` is 1-based within the
/// input query set and is assigned by the caller after the executor
/// returns; it must not change afterwards.
///
/// Exactly one of `plan_text` / `error_message` is populated, gated by
/// `success`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainResult {
    pub query_index: usize,
    pub sql_query: String,
    pub success: bool,
    pub plan_text: String,
    pub error_message: String,
    pub elapsed_seconds: f64,
    pub engine_name: String,
}

impl ExplainResult {
    pub fn succeeded(
        sql_query: &str,
        plan_text: String,
        elapsed_seconds: f64,
        engine_name: &str,
    ) -> Self {
        Self {
            query_index: 0,
            sql_query: sql_query.to_string(),
            success: true,
            plan_text,
            error_message: String::new(),
            elapsed_seconds,
            engine_name: engine_name.to_string(),
        }
    }

    pub fn failed(
        sql_query: &str,
        error_message: String,
        elapsed_seconds: f64,
        engine_name: &str,
    ) -> Self {
        Self {
            query_index: 0,
            sql_query: sql_query.to_string(),
            success: false,
            plan_text: String::new(),
            error_message,
            elapsed_seconds,
            engine_name: engine_name.to_string(),
        }
    }

    /// Single-line rendering of the query for list views.
    pub fn short_sql(&self) -> String {
        shorten_sql(&self.sql_query)
    }
}

/// Collapse whitespace runs to single spaces; truncate with an ellipsis
/// marker when the one-line form exceeds 80 characters.
pub fn shorten_sql(sql: &str) -> String {
    let oneline = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if oneline.chars().count() <= SHORT_SQL_MAX {
        return oneline;
    }
    let mut out: String = oneline.chars().take(SHORT_SQL_KEEP).collect();
    out.push_str("...");
    out
}
