//! Numeric identifiers for catalog records.
//!
//! Each record kind gets its own newtype so a station id can never be
//! passed where a line id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

record_id!(
    /// Identifier of a [`Line`](super::Line).
    LineId,
    "LineId"
);

record_id!(
    /// Identifier of a [`Station`](super::Station).
    StationId,
    "StationId"
);

record_id!(
    /// Identifier of a saved [`Location`](super::Location).
    LocationId,
    "LocationId"
);

record_id!(
    /// Identifier of the user owning a location.
    ///
    /// Users live outside this crate; only the id is tracked.
    UserId,
    "UserId"
);

record_id!(
    /// Identifier of a [`ScheduleEntry`](super::ScheduleEntry).
    EntryId,
    "EntryId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        let id = StationId(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(format!("{:?}", id), "StationId(42)");
        assert_eq!(format!("{:?}", LineId(7)), "LineId(7)");
    }

    #[test]
    fn ordering_follows_value() {
        assert!(StationId(1) < StationId(2));
        assert_eq!(StationId::from(5).get(), 5);
    }

    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&LocationId(3)).unwrap();
        assert_eq!(json, "3");
        let back: LocationId = serde_json::from_str("3").unwrap();
        assert_eq!(back, LocationId(3));
    }
}
