use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::analytics::parse_timestamp;
use crate::model::{is_allowed_page_size, Status};

/// Parses "Active,inactive". "all" or an empty string means no status filter.
pub fn parse_status_set_csv(value: &str) -> Result<BTreeSet<Status>, String> {
    let raw = value.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        return Ok(BTreeSet::new());
    }
    let mut out = BTreeSet::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        out.insert(item.parse::<Status>()?);
    }
    Ok(out)
}

pub fn parse_page_size(value: &str) -> Result<usize, String> {
    let size: usize = value
        .trim()
        .parse()
        .map_err(|_| "expected a number".to_string())?;
    if !is_allowed_page_size(size) {
        return Err("expected 5, 10 or 20".to_string());
    }
    Ok(size)
}

pub fn parse_positive(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err("expected positive integer".to_string()),
        Ok(n) => Ok(n),
    }
}

pub fn format_status_set(statuses: &BTreeSet<Status>) -> String {
    if statuses.is_empty() {
        return "all".to_string();
    }
    statuses
        .iter()
        .map(Status::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// "January 5, 2024 at 09:30 AM". Falls back to the raw string when it does not parse.
pub fn format_long_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%B %-d, %Y at %I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// Relative age of `then`: Today, Yesterday, N days/weeks/months ago.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - then).num_days();
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{d} days ago"),
        d if d < 30 => {
            let weeks = d / 7;
            format!("{weeks} week{} ago", if weeks > 1 { "s" } else { "" })
        }
        d => {
            let months = d / 30;
            format!("{months} month{} ago", if months > 1 { "s" } else { "" })
        }
    }
}

pub fn time_ago_str(raw: &str, now: DateTime<Utc>) -> String {
    parse_timestamp(raw)
        .map(|then| time_ago(then, now))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
