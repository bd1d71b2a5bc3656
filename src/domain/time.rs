//! Conversions between wall-clock `HH:MM` strings and minutes since midnight.
//!
//! Scheduling math is done on plain integers. Buffer arithmetic can push a
//! value below zero or past the end of the day, so the renderer clamps for
//! display only and never feeds the clamped value back into comparisons.

use crate::error::{AppError, Result};

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Parse `HH:MM` or `HH:MM:SS` into minutes since midnight.
///
/// Seconds are accepted for compatibility with stored `TIME` columns but are
/// dropped; scheduling works at minute resolution.
pub fn to_minutes(time_of_day: &str) -> Result<i32> {
    let invalid = || AppError::InvalidTimeFormat(format!("'{}' is not a valid HH:MM time", time_of_day));

    let mut parts = time_of_day.trim().split(':');
    let hour = parts.next().ok_or_else(invalid)?;
    let minute = parts.next().ok_or_else(invalid)?;
    let second = parts.next();
    if parts.next().is_some() {
        return Err(invalid());
    }

    let hour = parse_field(hour, 1..=2, 23).ok_or_else(invalid)?;
    let minute = parse_field(minute, 2..=2, 59).ok_or_else(invalid)?;
    if let Some(second) = second {
        parse_field(second, 2..=2, 59).ok_or_else(invalid)?;
    }

    Ok(hour * 60 + minute)
}

fn parse_field(raw: &str, width: std::ops::RangeInclusive<usize>, max: i32) -> Option<i32> {
    if !width.contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i32>().ok().filter(|v| *v <= max)
}

/// Render minutes since midnight as zero-padded `HH:MM`.
///
/// Out-of-day values are clamped to `00:00`..=`23:59`.
pub fn minutes_to_time_of_day(minutes: i32) -> String {
    let clamped = minutes.clamp(0, MINUTES_PER_DAY - 1);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Canonical stored form: `9:05` and `09:05:30` both become `09:05`, so
/// stored times sort lexically in chronological order.
pub fn normalize(time_of_day: &str) -> Result<String> {
    to_minutes(time_of_day).map(minutes_to_time_of_day)
}
