use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One candidate start time in a generated availability grid.
/// Produced fresh on every query; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Start time as minutes since midnight.
    pub minutes: i64,
    /// Display label ("2:30 PM").
    pub time: String,
    pub available: bool,
    /// Every staff member who could take this slot (empty when the
    /// business has no staff configured yet).
    pub eligible_staff_ids: Vec<Uuid>,
    /// Best-effort explanation when the slot is unavailable.
    pub conflict_reason: Option<String>,
}

/// An ephemeral travel estimate between two appointment locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveEstimate {
    pub duration_minutes: f64,
    pub distance_km: f64,
    pub source: super::enums::EstimateSource,
}
