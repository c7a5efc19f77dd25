use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::StaffAvailability;

/// Insert or replace the working-hours window for one staff member on
/// one weekday. Business configuration writes these; the engine only
/// reads them.
pub fn upsert_availability(
    conn: &Connection,
    avail: &StaffAvailability,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO staff_availability
             (id, staff_id, day_of_week, is_available, start_minutes, end_minutes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (staff_id, day_of_week) DO UPDATE SET
             is_available = excluded.is_available,
             start_minutes = excluded.start_minutes,
             end_minutes = excluded.end_minutes",
        params![
            avail.id.to_string(),
            avail.staff_id.to_string(),
            avail.day_of_week,
            avail.is_available,
            avail.start_minutes,
            avail.end_minutes,
        ],
    )?;
    Ok(())
}

/// The weekly availability record for one staff member on one weekday,
/// if configured.
pub fn availability_for_day(
    conn: &Connection,
    staff_id: Uuid,
    day_of_week: i64,
) -> Result<Option<StaffAvailability>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, staff_id, day_of_week, is_available, start_minutes, end_minutes
         FROM staff_availability
         WHERE staff_id = ?1 AND day_of_week = ?2",
        params![staff_id.to_string(), day_of_week],
        row_to_availability,
    );
    match result {
        Ok(a) => Ok(Some(a)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// True only when a record exists, the day is marked available, and
/// `[minute, minute + duration)` lies fully inside the window.
pub fn is_working(
    conn: &Connection,
    staff_id: Uuid,
    day_of_week: i64,
    minute: i64,
    duration_minutes: i64,
) -> Result<bool, DatabaseError> {
    Ok(availability_for_day(conn, staff_id, day_of_week)?
        .map(|a| a.covers(minute, duration_minutes))
        .unwrap_or(false))
}

fn row_to_availability(row: &rusqlite::Row<'_>) -> rusqlite::Result<StaffAvailability> {
    Ok(StaffAvailability {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        staff_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        day_of_week: row.get(2)?,
        is_available: row.get(3)?,
        start_minutes: row.get(4)?,
        end_minutes: row.get(5)?,
    })
}
