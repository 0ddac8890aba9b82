//! Date helper functions

use chrono::NaiveDateTime;

/// Format a date with a chrono format string, falling back to ISO form
/// when the format string itself is invalid.
///
/// # Examples
/// ```ignore
/// format_date(&date, "%B %-d, %Y") // -> "January 5, 2024"
/// ```
pub fn format_date(date: &NaiveDateTime, format: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", date.format(format)).is_err() {
        tracing::warn!("Invalid date format {:?}", format);
        return date_iso(date);
    }
    out
}

/// Date portion only, as written in front-matter
pub fn date_iso(date: &NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}
