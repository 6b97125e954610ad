// ABOUTME: Presentation helpers for the sbxray CLI
// ABOUTME: Human-readable durations, truncation, and byte counts

use chrono::Duration;

/// Format a duration as a compact human-readable string
pub fn format_duration(d: Duration) -> String {
    let total_seconds = d.num_seconds().max(0);
    if total_seconds < 60 {
        format!("{total_seconds}s")
    } else if total_seconds < 3600 {
        format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    } else {
        format!("{}h {}m", total_seconds / 3600, (total_seconds % 3600) / 60)
    }
}

/// Format an optional duration, "-" when absent
pub fn format_optional_duration(d: Option<Duration>) -> String {
    d.map(format_duration).unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to a maximum length with an ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let prefix: String = s.chars().take(max).collect();
        format!("{prefix}...")
    } else {
        s.to_string()
    }
}

/// Group digits of a byte count for readability
pub fn format_bytes(n: usize) -> String {
    let digits: Vec<char> = n.to_string().chars().rev().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out.chars().rev().collect()
}
