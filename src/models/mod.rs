pub mod appointment;
pub mod enums;
pub mod policy;
pub mod slot;
pub mod staff;

pub use appointment::*;
pub use enums::*;
pub use policy::*;
pub use slot::*;
pub use staff::*;
