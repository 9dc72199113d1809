//! Run orchestration: environment validation, executor wiring, the
//! per-query compare loop, report writing, and the console summary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use which::which;

use explainb_core::classify::classify;
use explainb_core::diff::{ComparisonResult, compare_plans};
use explainb_core::error::CompareError;
use explainb_core::report::{ReportMeta, assemble};

use crate::args::ExplainbArgs;
use crate::executor::{BendsqlExecutor, ExplainExecutor, SnowsqlExecutor};
use crate::render;
use crate::sql::parse_sql_file;
use crate::trace::RunTrace;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(
        "both DSN environment variables must be set \
         (BENDSQL_DSN1/BENDSQL_DSN2 or BEDNSQL_DSN1/BEDNSQL_DSN2)"
    )]
    MissingDsn,

    #[error("missing tool: {tool} ({hint})")]
    MissingTool { tool: String, hint: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("comparison precondition violated: {0}")]
    Compare(#[from] CompareError),
}

// Greedy `.+` pins the capture to the last `@`, so passwords containing
// `@` still get masked.
static DSN_CREDENTIALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w+]+://).+:.+(@[^@]+)$").unwrap());

static DSN_HOST_DB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^databend://[^@]+@([^/]+)/(.+)$").unwrap());

static HOST_WAREHOUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^-]+--([^.]+)").unwrap());

/// Mask credentials in a DSN for display and report use.
pub fn mask_dsn(dsn: &str) -> String {
    DSN_CREDENTIALS.replace(dsn, "$1***:***$2").into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsnInfo {
    pub warehouse: String,
    pub database: String,
}

/// Warehouse and database extracted from a `databend://` DSN whose host
/// segment follows the `prefix--warehouse.domain` convention.
pub fn parse_dsn_info(dsn: &str) -> DsnInfo {
    let unknown = || DsnInfo {
        warehouse: "Unknown".to_string(),
        database: "Unknown".to_string(),
    };
    let Some(captures) = DSN_HOST_DB.captures(dsn) else {
        return unknown();
    };
    let host = &captures[1];
    let database = captures[2].to_string();
    let warehouse = HOST_WAREHOUSE
        .captures(host)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    DsnInfo {
        warehouse,
        database,
    }
}

fn dsn_from_env(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .or_else(|_| std::env::var(fallback))
        .ok()
        .filter(|v| !v.trim().is_empty())
        // Undo bash history-expansion escaping of `!` in pasted DSNs.
        .map(|v| v.replace("\\!", "!"))
}

fn require_tool(tool: &str, hint: &str) -> Result<(), RunError> {
    which(tool).map(|_| ()).map_err(|_| RunError::MissingTool {
        tool: tool.to_string(),
        hint: hint.to_string(),
    })
}

/// Execute and compare every query, in input order. Indices are assigned
/// 1-based before comparison; the core rejects mismatched pairs.
pub fn compare_all(
    left: &dyn ExplainExecutor,
    right: &dyn ExplainExecutor,
    reference: Option<&dyn ExplainExecutor>,
    queries: &[String],
    timeout: Duration,
    trace: &RunTrace,
) -> Result<Vec<ComparisonResult>, RunError> {
    let total = queries.len();
    let mut comparisons: Vec<ComparisonResult> = Vec::with_capacity(total);

    for (index, query) in (1usize..).zip(queries.iter()) {
        trace.info(format!("processing query {index:02}/{total:02}"));

        let mut left_result = left.execute_explain(query, timeout);
        left_result.query_index = index;

        let mut right_result = right.execute_explain(query, timeout);
        right_result.query_index = index;

        let reference_result = reference.map(|executor| {
            trace.debug(format!("query {index:02}: fetching reference plan"));
            let mut result = executor.execute_explain(query, timeout);
            result.query_index = index;
            result
        });

        let comparison = compare_plans(left_result, right_result, reference_result)?;
        trace.info(format!(
            "query {index:02}: {} (similarity: {:.1}%)",
            classify(&comparison).as_str(),
            comparison.similarity_score * 100.0
        ));
        comparisons.push(comparison);
    }
    Ok(comparisons)
}

pub fn run(args: &ExplainbArgs, trace: &RunTrace) -> Result<(), RunError> {
    let dsn1 = dsn_from_env("BENDSQL_DSN1", "BEDNSQL_DSN1");
    let dsn2 = dsn_from_env("BENDSQL_DSN2", "BEDNSQL_DSN2");
    let (Some(dsn1), Some(dsn2)) = (dsn1, dsn2) else {
        return Err(RunError::MissingDsn);
    };

    require_tool("bendsql", "install bendsql and ensure it is on PATH")?;
    if !args.skip_reference {
        require_tool("snowsql", "install snowsql or pass --skip-reference")?;
    }

    trace.info(format!("sql file: {}", args.sql_file.display()));
    trace.info(format!("output: {}", args.output.display()));
    trace.info(format!("dsn1: {}", mask_dsn(&dsn1)));
    trace.info(format!("dsn2: {}", mask_dsn(&dsn2)));

    let queries = parse_sql_file(&args.sql_file)?;
    trace.info(format!("found {} queries", queries.len()));

    let timeout = Duration::from_secs(args.timeout);
    let version_timeout = Duration::from_secs(30);

    let left = BendsqlExecutor::new(&dsn1, "DSN1");
    let right = BendsqlExecutor::new(&dsn2, "DSN2");
    let left_version = left.version(version_timeout);
    let right_version = right.version(version_timeout);
    trace.info(format!("dsn1 version: {left_version}"));
    trace.info(format!("dsn2 version: {right_version}"));

    let reference = (!args.skip_reference).then(|| SnowsqlExecutor::new("Snowflake"));
    let reference_version = reference
        .as_ref()
        .map(|executor| executor.version(version_timeout))
        .unwrap_or_default();
    if reference.is_some() {
        trace.info(format!("reference version: {reference_version}"));
    } else {
        trace.debug("skipping reference engine (--skip-reference)");
    }

    let comparisons = compare_all(
        &left,
        &right,
        reference.as_ref().map(|r| r as &dyn ExplainExecutor),
        &queries,
        timeout,
        trace,
    )?;

    let dsn1_info = parse_dsn_info(&dsn1);
    let dsn2_info = parse_dsn_info(&dsn2);
    let meta = ReportMeta {
        title: "Explain Plan Comparison Report".to_string(),
        generation_time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        left_label: mask_dsn(&dsn1),
        right_label: mask_dsn(&dsn2),
        left_version,
        right_version,
        left_warehouse: dsn1_info.warehouse,
        left_database: dsn1_info.database,
        right_warehouse: dsn2_info.warehouse,
        right_database: dsn2_info.database,
        reference_version,
        sql_file: args.sql_file.display().to_string(),
    };

    let report = assemble(&comparisons, meta);
    render::write_report(&args.output, &report)?;
    print_summary(&report.statistics, &args.output);
    Ok(())
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn print_summary(stats: &explainb_core::report::Statistics, output: &Path) {
    let total = stats.total_queries;
    let abs_output = std::fs::canonicalize(output).unwrap_or_else(|_| output.to_path_buf());

    println!("\n{}", "=".repeat(60));
    println!("EXPLAINB COMPARISON COMPLETED");
    println!("{}", "=".repeat(60));
    println!("Total queries:    {total}");
    println!(
        "Identical plans:  {} ({:.1}%)",
        stats.identical_count,
        pct(stats.identical_count, total)
    );
    println!(
        "Similar plans:    {} ({:.1}%)",
        stats.similar_count,
        pct(stats.similar_count, total)
    );
    println!(
        "Different plans:  {} ({:.1}%)",
        stats.different_count,
        pct(stats.different_count, total)
    );
    println!(
        "Error queries:    {} ({:.1}%)",
        stats.error_count,
        pct(stats.error_count, total)
    );
    println!("Avg similarity:   {:.1}%", stats.avg_similarity * 100.0);
    println!("Report:           {}", abs_output.display());
    println!("{}", "=".repeat(60));

    if stats.error_count > 0 {
        println!("Some queries had errors; see the report for details.");
    }
}
