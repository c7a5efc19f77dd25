use serde::{Deserialize, Serialize};

/// Business booking policy, read from the settings store. Absent keys
/// fall back to these defaults; malformed values fail fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Minimum notice between "now" and a bookable start.
    pub min_lead_time_hours: i64,
    /// Idle time required between appointments beyond drive time.
    pub buffer_minutes: i64,
    /// Back-to-back appointments further apart than this are rejected.
    pub max_drive_distance_km: f64,
    /// Slot grid granularity.
    pub time_slot_interval_minutes: i64,
    /// IANA zone name ("America/Toronto"). `None` means UTC.
    pub time_zone: Option<String>,
    /// Globally non-operational weekday (0 = Sunday .. 6 = Saturday).
    pub closed_weekday: Option<i64>,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            min_lead_time_hours: 24,
            buffer_minutes: 30,
            max_drive_distance_km: 50.0,
            time_slot_interval_minutes: 30,
            time_zone: None,
            closed_weekday: Some(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_negative() {
        let p = BookingPolicy::default();
        assert!(p.min_lead_time_hours >= 0);
        assert!(p.buffer_minutes >= 0);
        assert!(p.max_drive_distance_km >= 0.0);
        assert!(p.time_slot_interval_minutes > 0);
    }

    #[test]
    fn default_closed_day_is_sunday() {
        assert_eq!(BookingPolicy::default().closed_weekday, Some(0));
    }
}
