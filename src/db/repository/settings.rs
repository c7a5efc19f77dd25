use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::BookingPolicy;

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, DatabaseError> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Read the booking policy for this business. Absent keys fall back to
/// engine defaults; present-but-malformed values fail fast.
pub fn load_policy(conn: &Connection) -> Result<BookingPolicy, DatabaseError> {
    let defaults = BookingPolicy::default();
    Ok(BookingPolicy {
        min_lead_time_hours: parse_setting(conn, "min_lead_time_hours", defaults.min_lead_time_hours)?,
        buffer_minutes: parse_setting(conn, "buffer_minutes", defaults.buffer_minutes)?,
        max_drive_distance_km: parse_setting(conn, "max_drive_distance_km", defaults.max_drive_distance_km)?,
        time_slot_interval_minutes: parse_setting(
            conn,
            "time_slot_interval_minutes",
            defaults.time_slot_interval_minutes,
        )?,
        time_zone: get_setting(conn, "time_zone")?,
        closed_weekday: match get_setting(conn, "closed_weekday")? {
            Some(raw) => Some(parse_value(&raw, "closed_weekday")?),
            None => defaults.closed_weekday,
        },
    })
}

fn parse_setting<T: std::str::FromStr>(
    conn: &Connection,
    key: &str,
    default: T,
) -> Result<T, DatabaseError> {
    match get_setting(conn, key)? {
        Some(raw) => parse_value(&raw, key),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, DatabaseError> {
    raw.trim().parse().map_err(|_| DatabaseError::InvalidSetting {
        key: key.into(),
        value: raw.into(),
    })
}
