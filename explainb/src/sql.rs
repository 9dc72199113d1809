//! SQL file reading. Queries are opaque strings split on statement
//! boundaries; no parsing beyond comment and blank-line stripping.

use std::path::Path;

use crate::run::RunError;

/// Split file content on `;`, dropping `--` comment lines and blanks, and
/// joining each statement's remaining lines with single spaces.
pub fn split_statements(content: &str) -> Vec<String> {
    content
        .split(';')
        .filter_map(|raw| {
            let lines: Vec<&str> = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("--"))
                .collect();
            let query = lines.join(" ");
            (!query.is_empty()).then_some(query)
        })
        .collect()
}

pub fn parse_sql_file(path: &Path) -> Result<Vec<String>, RunError> {
    let content = std::fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_statements(&content))
}
