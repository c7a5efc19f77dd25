//! Time & zone normalization.
//!
//! Appointments are grouped by a calendar-day key computed in the
//! business's configured time zone — never the host machine's local
//! zone. Times-of-day are handled as minutes since midnight and parsed
//! from both 12-hour ("2:30 PM") and 24-hour ("14:30") notation.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid time string: {0}")]
    InvalidTime(String),

    #[error("Unknown time zone: {0}")]
    InvalidZone(String),
}

/// Resolve a policy zone name. `None` falls back to UTC.
pub fn zone(name: Option<&str>) -> Result<Tz, TimeError> {
    match name {
        Some(raw) => raw
            .parse::<Tz>()
            .map_err(|_| TimeError::InvalidZone(raw.into())),
        None => Ok(Tz::UTC),
    }
}

/// Stable "YYYY-MM-DD" storage key for a calendar date. The appointment
/// store groups rows by this key.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Stable "YYYY-MM-DD" key for grouping appointments by calendar day
/// in the given zone.
pub fn day_key(instant: DateTime<Utc>, tz: Tz) -> String {
    date_key(instant.with_timezone(&tz).date_naive())
}

/// The calendar date and minute-of-day of `instant` in the given zone.
pub fn local_date_and_minute(instant: DateTime<Utc>, tz: Tz) -> (NaiveDate, i64) {
    let local = instant.with_timezone(&tz);
    let date = local.date_naive();
    let minute = i64::from(chrono::Timelike::hour(&local)) * 60
        + i64::from(chrono::Timelike::minute(&local));
    (date, minute)
}

/// The UTC instant of `minute` on `date` in the given zone. Ambiguous
/// local times (DST fold) resolve to the earlier instant.
pub fn local_to_utc(date: NaiveDate, minute: i64, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
    let naive = date
        .and_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0)
        .ok_or_else(|| TimeError::InvalidTime(format!("{minute} minutes on {date}")))?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeError::InvalidTime(format!("{naive} does not exist in {tz}")))
}

/// Parse a textual time-of-day into minutes since midnight.
///
/// Accepts "2:30 PM", "2:30pm", "14:30", and bare hours; a bare hour
/// without meridiem is treated as 24-hour ("14" → 840).
pub fn to_minutes(text: &str) -> Result<i64, TimeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TimeError::InvalidTime(text.into()));
    }

    let upper = trimmed.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end().to_string(), Some(Meridiem::Am))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end().to_string(), Some(Meridiem::Pm))
    } else {
        (upper, None)
    };

    let mut parts = clock.split(':');
    let hour: i64 = parts
        .next()
        .and_then(|h| h.trim().parse().ok())
        .ok_or_else(|| TimeError::InvalidTime(text.into()))?;
    let minute: i64 = match parts.next() {
        Some(m) => m
            .trim()
            .parse()
            .map_err(|_| TimeError::InvalidTime(text.into()))?,
        None => 0,
    };
    if parts.next().is_some() || !(0..60).contains(&minute) {
        return Err(TimeError::InvalidTime(text.into()));
    }

    let hour24 = match meridiem {
        Some(Meridiem::Am) => match hour {
            12 => 0,
            1..=11 => hour,
            _ => return Err(TimeError::InvalidTime(text.into())),
        },
        Some(Meridiem::Pm) => match hour {
            12 => 12,
            1..=11 => hour + 12,
            _ => return Err(TimeError::InvalidTime(text.into())),
        },
        None => {
            if !(0..24).contains(&hour) {
                return Err(TimeError::InvalidTime(text.into()));
            }
            hour
        }
    };

    Ok(hour24 * 60 + minute)
}

/// Format minutes-since-midnight as a 12-hour display label ("2:30 PM").
pub fn format_minutes(minutes: i64) -> String {
    let hour24 = (minutes / 60).rem_euclid(24);
    let minute = minutes.rem_euclid(60);
    let (hour12, meridiem) = match hour24 {
        0 => (12, "AM"),
        1..=11 => (hour24, "AM"),
        12 => (12, "PM"),
        _ => (hour24 - 12, "PM"),
    };
    format!("{hour12}:{minute:02} {meridiem}")
}

enum Meridiem {
    Am,
    Pm,
}
