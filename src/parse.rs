//! Parsing boundary for form fields that carry a format.
//!
//! Every write path runs its raw text through these functions before the store is
//! touched, so a rejected value never reaches SQLite.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{DeskError, DeskResult};

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const TIME_FORMAT: &str = "%H:%M";

// chrono's `%Y` takes any width and sign and `%d`/`%m` allow padding spaces.
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("date shape pattern to compile")
});
static TIME_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{1,2}$").expect("time shape pattern to compile"));

/// A day.month.year calendar date with a four-digit year. Returns the trimmed text
/// alongside the parsed value.
pub fn date(value: &str) -> DeskResult<(String, NaiveDate)> {
    let trimmed = value.trim();
    if !DATE_SHAPE.is_match(trimmed) {
        return Err(DeskError::format("date", value, "day.month.year date"));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(|parsed| (trimmed.to_string(), parsed))
        .map_err(|_| DeskError::format("date", value, "day.month.year date"))
}

/// A 24-hour hour:minute time.
pub fn time(value: &str) -> DeskResult<(String, NaiveTime)> {
    let trimmed = value.trim();
    if !TIME_SHAPE.is_match(trimmed) {
        return Err(DeskError::format("time", value, "24-hour hour:minute time"));
    }
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map(|parsed| (trimmed.to_string(), parsed))
        .map_err(|_| DeskError::format("time", value, "24-hour hour:minute time"))
}

/// A finite, non-negative decimal price.
pub fn price(value: &str) -> DeskResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(parsed),
        _ => Err(DeskError::format("price", value, "non-negative decimal number")),
    }
}

/// Whole minutes. Sign is not checked.
pub fn duration(value: &str) -> DeskResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| DeskError::format("duration", value, "whole number of minutes"))
}
