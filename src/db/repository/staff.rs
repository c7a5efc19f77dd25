use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Staff;

pub fn insert_staff(conn: &Connection, staff: &Staff) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO staff (id, name, active) VALUES (?1, ?2, ?3)",
        params![staff.id.to_string(), staff.name, staff.active],
    )?;
    Ok(())
}

pub fn get_staff(conn: &Connection, id: Uuid) -> Result<Option<Staff>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, active FROM staff WHERE id = ?1",
        params![id.to_string()],
        row_to_staff,
    );
    match result {
        Ok(staff) => Ok(Some(staff)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Active staff members, ordered by name for deterministic pool order.
pub fn active_staff(conn: &Connection) -> Result<Vec<Staff>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, active FROM staff WHERE active = 1 ORDER BY name ASC, id ASC",
    )?;
    let rows = stmt.query_map([], row_to_staff)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn deactivate_staff(conn: &Connection, id: Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE staff SET active = 0 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Staff".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn row_to_staff(row: &rusqlite::Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        name: row.get(1)?,
        active: row.get(2)?,
    })
}
