//! Plan text normalization.
//!
//! EXPLAIN output carries run-to-run noise (session ids, timestamps, query
//! ids) that would make every comparison a diff. Normalization strips those
//! regions and blank lines before alignment; nothing else is touched, so
//! genuine formatting differences still show up.

use once_cell::sync::Lazy;
use regex::Regex;

/// One volatile-field pattern. Matches are removed outright, no
/// placeholder left behind.
pub struct VolatilePattern {
    pub name: &'static str,
    pub regex: Regex,
}

/// Ordered pattern table; extend here rather than inside `normalize_plan`.
pub static VOLATILE_PATTERNS: Lazy<Vec<VolatilePattern>> = Lazy::new(|| {
    [
        ("session_id", r"\bsession_id:\s*\w+"),
        ("timestamp", r"\btimestamp:\s*[\d-]+\s+[\d:]+"),
        ("query_id", r"\bquery_id:\s*\w+"),
    ]
    .into_iter()
    .map(|(name, pattern)| VolatilePattern {
        name,
        regex: Regex::new(pattern).unwrap_or_else(|e| panic!("bad volatile pattern {name}: {e}")),
    })
    .collect()
});

/// Strip the volatile patterns from a single line and trim the remainder.
pub fn scrub_line(line: &str) -> String {
    let mut scrubbed = line.to_string();
    for pat in VOLATILE_PATTERNS.iter() {
        scrubbed = pat.regex.replace_all(&scrubbed, "").into_owned();
    }
    scrubbed.trim().to_string()
}

/// Normalize raw plan text into the ordered line sequence used for
/// alignment. Lines blank before scrubbing are dropped; a line emptied
/// *by* scrubbing is kept (it still occupies an alignment slot).
pub fn normalize_plan(plan: &str) -> Vec<String> {
    plan.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(scrub_line)
        .collect()
}
