use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

/// Working-hours window for one staff member on one weekday
/// (0 = Sunday .. 6 = Saturday). Start/end are ignored when
/// `is_available` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffAvailability {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub day_of_week: i64,
    pub is_available: bool,
    pub start_minutes: i64,
    pub end_minutes: i64,
}

impl StaffAvailability {
    /// True when `[minute, minute + duration)` lies fully inside the
    /// working window.
    pub fn covers(&self, minute: i64, duration_minutes: i64) -> bool {
        self.is_available
            && minute >= self.start_minutes
            && minute + duration_minutes <= self.end_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: i64, end: i64) -> StaffAvailability {
        StaffAvailability {
            id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            day_of_week: 1,
            is_available: true,
            start_minutes: start,
            end_minutes: end,
        }
    }

    #[test]
    fn covers_requires_full_containment() {
        let w = window(8 * 60, 18 * 60);
        assert!(w.covers(8 * 60, 60));
        assert!(w.covers(17 * 60, 60));
        assert!(!w.covers(17 * 60 + 30, 60)); // runs past close
        assert!(!w.covers(7 * 60, 60)); // starts before open
    }

    #[test]
    fn unavailable_day_never_covers() {
        let mut w = window(0, 24 * 60);
        w.is_available = false;
        assert!(!w.covers(10 * 60, 30));
    }
}
