use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use itertools::Itertools;
use serde::Serialize;

use crate::model::{Status, User};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of most recent months kept for the chart.
pub const CHART_MONTHS: usize = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// "Jan 2024"
    pub label: String,
    pub year: i32,
    /// 1-based calendar month.
    pub month: u32,
    pub users: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Analytics {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Percentage 0..=100.
    pub active_rate: u32,
    pub buckets: Vec<MonthBucket>,
    pub avg_per_month: usize,
    /// Records left out of the chart because their join date did not parse.
    pub skipped: usize,
}

impl Analytics {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Parses a join/last-seen timestamp into UTC.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken as UTC) and a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???");
    format!("{name} {year}")
}

/// Join counts per calendar month, oldest first, trimmed to the last [`CHART_MONTHS`].
///
/// Returns the buckets and how many users were skipped for an unparseable `joined_at`.
pub fn monthly_buckets(users: &[User]) -> (Vec<MonthBucket>, usize) {
    let mut skipped = 0usize;
    let months = users
        .iter()
        .filter_map(|u| match parse_timestamp(&u.joined_at) {
            Some(dt) => Some((dt.year(), dt.month())),
            None => {
                tracing::warn!(
                    user = %u.id,
                    joined_at = %u.joined_at,
                    "skipping user with unparseable join date"
                );
                skipped += 1;
                None
            }
        })
        .counts();

    let mut buckets: Vec<MonthBucket> = months
        .into_iter()
        .map(|((year, month), users)| MonthBucket {
            label: month_label(year, month),
            year,
            month,
            users,
        })
        .collect();
    buckets.sort_by_key(|b| (b.year, b.month));
    let keep_from = buckets.len().saturating_sub(CHART_MONTHS);
    buckets.drain(..keep_from);
    (buckets, skipped)
}

fn round_ratio(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    // Non-negative, so this is round-half-up.
    (numerator * 2 + denominator) / (denominator * 2)
}

pub fn active_rate(active: usize, total: usize) -> u32 {
    round_ratio(active * 100, total) as u32
}

pub fn aggregate(users: &[User]) -> Analytics {
    let active = users.iter().filter(|u| u.status == Status::Active).count();
    let inactive = users.len() - active;
    let (buckets, skipped) = monthly_buckets(users);
    let shown: usize = buckets.iter().map(|b| b.users).sum();
    Analytics {
        total: users.len(),
        active,
        inactive,
        active_rate: active_rate(active, users.len()),
        avg_per_month: round_ratio(shown, buckets.len()),
        buckets,
        skipped,
    }
}
