//! Slotwise — appointment availability and conflict engine for
//! on-location service businesses.
//!
//! Given a date, a service duration, and a destination, the engine
//! produces the grid of bookable start times, accounting for staff
//! schedules, existing appointments, drive time between locations, and
//! the business's booking policy.

pub mod booking;
pub mod config;
pub mod conflict;
pub mod db;
pub mod distance;
pub mod models;
pub mod slots;
pub mod timeutil;

use tracing_subscriber::EnvFilter;

pub use booking::{validate, BookingForm, ValidationReport};
pub use conflict::{check_conflicts, Candidate, ConflictCheck};
pub use db::sqlite::{open_database, open_memory_database};
pub use db::DatabaseError;
pub use distance::{DistanceEstimator, MatrixClient};
pub use models::{
    Appointment, AppointmentStatus, BookingPolicy, ContactType, DriveEstimate, EstimateSource,
    GeoPoint, Staff, StaffAvailability, TimeSlot,
};
pub use slots::{generate_slots, DayContext, SlotQuery};
pub use timeutil::TimeError;

/// Top-level error for applications embedding the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Initialize tracing for binaries embedding the engine. Library users
/// that install their own subscriber should skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::ENGINE_NAME, config::ENGINE_VERSION);
}
