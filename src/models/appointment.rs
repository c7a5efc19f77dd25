use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// A geographic coordinate pair (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A booked job. `staff_id` is `None` for unassigned bookings; the
/// engine only reads a day-scoped, staff-scoped view of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub staff_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_minutes: i64,
    pub duration_minutes: i64,
    pub status: AppointmentStatus,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

impl Appointment {
    pub fn end_minutes(&self) -> i64 {
        self.start_minutes + self.duration_minutes
    }

    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            staff_id: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            start_minutes: 10 * 60,
            duration_minutes: 60,
            status: AppointmentStatus::Scheduled,
            latitude: None,
            longitude: None,
            address: Some("12 Elm St".into()),
        }
    }

    #[test]
    fn end_minutes_adds_duration() {
        assert_eq!(sample().end_minutes(), 11 * 60);
    }

    #[test]
    fn location_requires_both_coordinates() {
        let mut appt = sample();
        assert!(appt.location().is_none());
        appt.latitude = Some(45.5);
        assert!(appt.location().is_none());
        appt.longitude = Some(-73.6);
        let loc = appt.location().unwrap();
        assert_eq!(loc.latitude, 45.5);
        assert_eq!(loc.longitude, -73.6);
    }
}
