//! Repository layer — entity-scoped database operations.
//!
//! The engine only reads through these; booking creation and
//! cancellation are driven by the surrounding application.

mod appointment;
mod availability;
mod settings;
mod staff;

pub use appointment::*;
pub use availability::*;
pub use settings::*;
pub use staff::*;
