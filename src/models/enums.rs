use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    InRevision => "in_revision",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl AppointmentStatus {
    /// Cancelled appointments never participate in conflict checks.
    pub fn blocks_schedule(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

str_enum!(ContactType {
    Email => "email",
    Phone => "phone",
});

str_enum!(EstimateSource {
    MappingService => "mapping_service",
    Heuristic => "heuristic",
    FallbackDefault => "fallback_default",
});
