use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus};
use crate::timeutil::date_key;

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments
             (id, staff_id, date, start_minutes, duration_minutes, status,
              latitude, longitude, address)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id.to_string(),
            appt.staff_id.map(|id| id.to_string()),
            date_key(appt.date),
            appt.start_minutes,
            appt.duration_minutes,
            appt.status.as_str(),
            appt.latitude,
            appt.longitude,
            appt.address,
        ],
    )?;
    Ok(())
}

pub fn cancel_appointment(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = 'cancelled' WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Non-cancelled appointments for one calendar day, optionally scoped
/// to one staff member, ordered by start time.
pub fn appointments_for_day(
    conn: &Connection,
    date: NaiveDate,
    staff_id: Option<Uuid>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, staff_id, date, start_minutes, duration_minutes, status,
                latitude, longitude, address
         FROM appointments
         WHERE date = ?1
           AND status != 'cancelled'
           AND (?2 IS NULL OR staff_id = ?2)
         ORDER BY start_minutes ASC",
    )?;

    let rows = stmt.query_map(
        params![date_key(date), staff_id.map(|id| id.to_string())],
        |row| {
            Ok(RawAppointment {
                id: row.get(0)?,
                staff_id: row.get(1)?,
                date: row.get(2)?,
                start_minutes: row.get(3)?,
                duration_minutes: row.get(4)?,
                status: row.get(5)?,
                latitude: row.get(6)?,
                longitude: row.get(7)?,
                address: row.get(8)?,
            })
        },
    )?;

    let raw: Vec<RawAppointment> = rows.collect::<Result<_, _>>()?;
    raw.into_iter().map(RawAppointment::into_appointment).collect()
}

struct RawAppointment {
    id: String,
    staff_id: Option<String>,
    date: String,
    start_minutes: i64,
    duration_minutes: i64,
    status: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
}

impl RawAppointment {
    fn into_appointment(self) -> Result<Appointment, DatabaseError> {
        let status = AppointmentStatus::from_str(&self.status)?;
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").map_err(|_| {
            DatabaseError::InvalidEnum {
                field: "date".into(),
                value: self.date.clone(),
            }
        })?;
        Ok(Appointment {
            id: Uuid::parse_str(&self.id).unwrap_or_default(),
            staff_id: self.staff_id.and_then(|s| Uuid::parse_str(&s).ok()),
            date,
            start_minutes: self.start_minutes,
            duration_minutes: self.duration_minutes,
            status,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
        })
    }
}
