//! EXPLAIN executors. The run loop and the comparison core depend only on
//! the `ExplainExecutor` trait and the `ExplainResult` shape, never on
//! which tool produced a plan.

use std::process::Command;
use std::time::{Duration, Instant};

use explainb_core::explain::ExplainResult;

use crate::process::{CaptureOutcome, decode_output, run_capture_with_timeout};

pub const DEFAULT_SNOWFLAKE_WAREHOUSE: &str = "COMPUTE_WH";
pub const DEFAULT_SNOWFLAKE_DATABASE: &str = "TPCDS_100";

pub trait ExplainExecutor {
    fn engine_name(&self) -> &str;

    /// Human-readable backend version, best effort; failures degrade to a
    /// placeholder string rather than aborting the run.
    fn version(&self, timeout: Duration) -> String;

    /// Run EXPLAIN for one query. Never errors: tool failures, non-zero
    /// exits, and timeouts all come back as `success=false` results with
    /// the elapsed time recorded. `query_index` is left at 0 for the
    /// caller to assign.
    fn execute_explain(&self, query: &str, timeout: Duration) -> ExplainResult;
}

/// Executor for a Databend deployment, driven through `bendsql`.
pub struct BendsqlExecutor {
    dsn: String,
    name: String,
}

impl BendsqlExecutor {
    pub fn new(dsn: &str, name: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            name: name.to_string(),
        }
    }
}

impl ExplainExecutor for BendsqlExecutor {
    fn engine_name(&self) -> &str {
        &self.name
    }

    fn version(&self, timeout: Duration) -> String {
        let mut command = Command::new("bendsql");
        command
            .arg("--query=SELECT version()")
            .env("BENDSQL_DSN", &self.dsn);
        probe_version(command, timeout, |line| {
            !line.starts_with('+')
                && !line.starts_with('|')
                && !line.to_lowercase().contains("version()")
        })
    }

    fn execute_explain(&self, query: &str, timeout: Duration) -> ExplainResult {
        let explain_query = format!("EXPLAIN {}", query.trim_end_matches(';'));
        let mut command = Command::new("bendsql");
        command
            .arg(format!("--query={explain_query}"))
            .env("BENDSQL_DSN", &self.dsn);

        finish_explain(command, query, timeout, &self.name, |stdout| {
            Ok(stdout.trim().to_string())
        })
    }
}

/// Executor for the read-only Snowflake reference, driven through
/// `snowsql`. Warehouse and database come from the environment, falling
/// back to the historical defaults.
pub struct SnowsqlExecutor {
    name: String,
    warehouse: String,
    database: String,
}

impl SnowsqlExecutor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            warehouse: std::env::var("SNOWFLAKE_WAREHOUSE")
                .unwrap_or_else(|_| DEFAULT_SNOWFLAKE_WAREHOUSE.to_string()),
            database: std::env::var("SNOWFLAKE_DATABASE")
                .unwrap_or_else(|_| DEFAULT_SNOWFLAKE_DATABASE.to_string()),
        }
    }

    fn base_args(&self, query: &str) -> Vec<String> {
        let mut args = vec![
            "--query".to_string(),
            query.to_string(),
            "--dbname".to_string(),
            self.database.clone(),
            "--schemaname".to_string(),
            "PUBLIC".to_string(),
            "-o".to_string(),
            "output_format=tsv".to_string(),
            "-o".to_string(),
            "header=false".to_string(),
            "-o".to_string(),
            "timing=false".to_string(),
            "-o".to_string(),
            "friendly=false".to_string(),
        ];
        if !self.warehouse.is_empty() {
            args.push("--warehouse".to_string());
            args.push(self.warehouse.clone());
        }
        args
    }
}

impl ExplainExecutor for SnowsqlExecutor {
    fn engine_name(&self) -> &str {
        &self.name
    }

    fn version(&self, timeout: Duration) -> String {
        let mut command = Command::new("snowsql");
        command.args(self.base_args("SELECT CURRENT_VERSION();"));
        probe_version(command, timeout, |line| !line.starts_with("CURRENT_VERSION"))
    }

    fn execute_explain(&self, query: &str, timeout: Duration) -> ExplainResult {
        let explain_query = format!("EXPLAIN USING TEXT {}", query.trim_end_matches(';'));
        let mut command = Command::new("snowsql");
        command.args(self.base_args(&explain_query));

        finish_explain(command, query, timeout, &self.name, |stdout| {
            // snowsql prints Python-style `None` for NULLs in tsv mode.
            let plan = stdout.replace("None", "NULL").trim().to_string();
            if plan.is_empty() {
                Err("snowsql returned empty result".to_string())
            } else {
                Ok(plan)
            }
        })
    }
}

/// Run a version probe under the same timeout machinery as the EXPLAIN
/// runs; a hung tool degrades to a placeholder instead of stalling the
/// whole run.
pub(crate) fn probe_version(
    command: Command,
    timeout: Duration,
    keep: impl Fn(&str) -> bool,
) -> String {
    match run_capture_with_timeout(command, timeout) {
        Ok(CaptureOutcome::Completed(output)) if output.status.success() => {
            let stdout = decode_output(&output.stdout);
            pick_version_line(&stdout, keep)
        }
        Ok(CaptureOutcome::Completed(_)) | Err(_) => "Version unavailable".to_string(),
        Ok(CaptureOutcome::TimedOut { .. }) => "Version query timeout".to_string(),
    }
}

/// Last meaningful stdout line of a version probe; tools wrap the value in
/// table chrome or echo the query header.
pub(crate) fn pick_version_line(stdout: &str, keep: impl Fn(&str) -> bool) -> String {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty() && keep(line))
        .unwrap_or_else(|| stdout.trim())
        .to_string()
}

/// Shared tail of both executors: run the command under the timeout and
/// fold every outcome into an `ExplainResult`.
fn finish_explain(
    command: Command,
    query: &str,
    timeout: Duration,
    engine_name: &str,
    accept_stdout: impl Fn(&str) -> Result<String, String>,
) -> ExplainResult {
    let started = Instant::now();
    match run_capture_with_timeout(command, timeout) {
        Ok(CaptureOutcome::Completed(output)) => {
            let stdout = decode_output(&output.stdout);
            let elapsed = output.elapsed.as_secs_f64();
            if output.status.success() {
                match accept_stdout(&stdout) {
                    Ok(plan) => ExplainResult::succeeded(query, plan, elapsed, engine_name),
                    Err(message) => ExplainResult::failed(query, message, elapsed, engine_name),
                }
            } else {
                let stderr = decode_output(&output.stderr);
                let message = if stderr.trim().is_empty() {
                    stdout.trim().to_string()
                } else {
                    stderr.trim().to_string()
                };
                ExplainResult::failed(query, message, elapsed, engine_name)
            }
        }
        Ok(CaptureOutcome::TimedOut { timeout }) => ExplainResult::failed(
            query,
            format!("Query timeout after {} seconds", timeout.as_secs()),
            timeout.as_secs_f64(),
            engine_name,
        ),
        Err(spawn_err) => ExplainResult::failed(
            query,
            spawn_err.to_string(),
            started.elapsed().as_secs_f64(),
            engine_name,
        ),
    }
}
