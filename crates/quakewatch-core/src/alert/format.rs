//! Human-readable alert renderings.
//!
//! Timestamps are passed in pre-formatted so rendering stays pure.

use std::fmt::Write;

use super::{AlertItem, Classification};

const RULE_WIDTH: usize = 60;

/// Console banner printed once per batch.
pub fn banner(class: Classification, timestamp: &str) -> String {
    format!(
        "\n🚨 ALERT RECEIVED [{}] - {}\n{}\n",
        class.as_str().to_uppercase(),
        timestamp,
        "=".repeat(RULE_WIDTH)
    )
}

/// Multi-line block for one alert, terminated by a dashed separator line.
pub fn block_lines(item: &AlertItem) -> Vec<String> {
    let mut lines = vec![
        format!("Status: {}", item.status),
        format!("Alert: {}", item.alertname),
        format!("Severity: {}", item.severity),
        format!("Service: {}", item.service),
        format!("Summary: {}", item.summary),
        format!("Description: {}", item.description),
        format!("Started: {}", item.starts_at),
    ];
    if let Some(ends_at) = &item.ends_at {
        lines.push(format!("Ended: {ends_at}"));
    }
    lines.push("-".repeat(RULE_WIDTH));
    lines
}

/// Console rendering of one alert.
pub fn console_block(item: &AlertItem) -> String {
    let mut out = String::new();
    for line in block_lines(item) {
        let _ = writeln!(out, "{line}");
    }
    out
}

/// One-line summary written to the log file only.
pub fn summary_line(class: Classification, item: &AlertItem) -> String {
    format!("ALERT [{}] - {} - {}", class, item.alertname, item.summary)
}

/// File rendering of one alert: block plus summary, every line prefixed.
///
/// `prefix` is the per-line `<timestamp> - <LEVEL> - ` header.
pub fn file_record(class: Classification, item: &AlertItem, prefix: &str) -> String {
    let mut out = String::new();
    for line in block_lines(item) {
        let _ = writeln!(out, "{prefix}{line}");
    }
    let _ = writeln!(out, "{prefix}{}", summary_line(class, item));
    out
}
