//! Military date formatting (`04JAN2026`).

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};

/// Input layouts accepted for the admin date, tried in order.
///
/// Month-first wins over day-first for ambiguous slash dates.
const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d %b %Y",
    "%b %d, %Y",
    "%d%b%Y",
];

/// `%Y` also accepts short years; only four-digit years count as a match.
const FOUR_DIGIT_YEARS: RangeInclusive<i32> = 1000..=9999;

/// Convert a date string to `DDMONYYYY` (upper case).
///
/// Unrecognized input passes through unchanged; empty stays empty.
pub fn format_military_date(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    parse_date(trimmed)
        .map(|d| d.format("%d%b%Y").to_string().to_uppercase())
        .unwrap_or_else(|| input.to_string())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    INPUT_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find(|d| FOUR_DIGIT_YEARS.contains(&d.year()))
}
