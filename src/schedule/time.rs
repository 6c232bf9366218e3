//! Time-of-day parsing and 12-hour display formatting.
//!
//! Stored times are `HH:MM:SS` strings; form inputs may omit the seconds.

use chrono::{NaiveTime, Timelike};

/// A stored or submitted time string that is not a valid `HH:MM[:SS]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTimeError {
    pub raw: String,
}

impl std::fmt::Display for MalformedTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed time {:?}, expected HH:MM or HH:MM:SS", self.raw)
    }
}

impl std::error::Error for MalformedTimeError {}

/// Parse `HH:MM:SS` or `HH:MM`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, MalformedTimeError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| MalformedTimeError {
            raw: raw.to_string(),
        })
}

/// Canonical storage form, `HH:MM:SS`.
pub fn normalize_time(raw: &str) -> Result<String, MalformedTimeError> {
    parse_time(raw).map(|t| t.format("%H:%M:%S").to_string())
}

/// Render a time as `9AM`, `9:30AM`, `12PM`.
///
/// Malformed input is returned unchanged; display never fails.
pub fn format_time_12h(raw: &str) -> String {
    match parse_time(raw) {
        Ok(time) => {
            let hour = time.hour();
            let hour12 = if hour % 12 == 0 { 12 } else { hour % 12 };
            let suffix = if hour >= 12 { "PM" } else { "AM" };
            if time.minute() == 0 {
                format!("{}{}", hour12, suffix)
            } else {
                format!("{}:{:02}{}", hour12, time.minute(), suffix)
            }
        }
        Err(e) => {
            tracing::debug!("{}; displaying raw value", e);
            raw.to_string()
        }
    }
}

/// Working window shown in the schedule grid, e.g. `9AM-5PM`.
pub fn format_time_range(start: &str, end: &str) -> String {
    format!("{}-{}", format_time_12h(start), format_time_12h(end))
}

/// Hours since midnight as a decimal (`hour + minute / 60`). Seconds are ignored.
pub fn decimal_hours(raw: &str) -> Result<f64, MalformedTimeError> {
    let time = parse_time(raw)?;
    Ok(time.hour() as f64 + time.minute() as f64 / 60.0)
}
