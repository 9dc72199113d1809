//! HTML report writing: the embedded template carries a `{report_data}`
//! slot that receives the pretty-printed JSON payload; everything else is
//! rendered in the browser.

use std::path::Path;

use explainb_core::report::ReportData;

use crate::run::RunError;

const TEMPLATE: &str = include_str!("../templates/report.html");
const DATA_SLOT: &str = "{report_data}";

pub fn render_report(report: &ReportData) -> String {
    let json = serde_json::to_string_pretty(report)
        .unwrap_or_else(|_| "{\"error\": \"serialization failed\"}".to_string());
    TEMPLATE.replacen(DATA_SLOT, &json, 1)
}

pub fn write_report(path: &Path, report: &ReportData) -> Result<(), RunError> {
    std::fs::write(path, render_report(report)).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })
}
