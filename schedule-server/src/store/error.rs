//! Store error types.

use std::fmt;

/// The kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Line,
    Station,
    Location,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Line => "line",
            RecordKind::Station => "station",
            RecordKind::Location => "location",
        };
        f.write_str(name)
    }
}

/// Errors raised by a [`ScheduleStore`](super::ScheduleStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Referenced record does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u64 },

    /// A lock was poisoned by a panicking writer
    #[error("store lock poisoned")]
    Poisoned,

    /// Snapshot could not be read or written
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}

impl StoreError {
    pub fn line_not_found(id: impl Into<u64>) -> Self {
        StoreError::NotFound {
            kind: RecordKind::Line,
            id: id.into(),
        }
    }

    pub fn station_not_found(id: impl Into<u64>) -> Self {
        StoreError::NotFound {
            kind: RecordKind::Station,
            id: id.into(),
        }
    }

    pub fn location_not_found(id: impl Into<u64>) -> Self {
        StoreError::NotFound {
            kind: RecordKind::Location,
            id: id.into(),
        }
    }

    /// Whether this error means a record was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
