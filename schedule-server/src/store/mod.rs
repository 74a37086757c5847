//! Data access for schedule resolution.
//!
//! The resolvers in [`crate::schedule`] only talk to a [`ScheduleStore`],
//! so they can be exercised against any backing store. [`MemoryStore`]
//! is the in-process implementation used by the server, with optional
//! JSON snapshots on disk.

mod error;
mod memory;
mod snapshot;

use chrono::{DateTime, Utc};

use crate::domain::{
    DayLabel, Line, LineId, Location, NewScheduleEntry, ScheduleEntry, ServiceDate, Station,
    StationId,
};

pub use error::{RecordKind, StoreError};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Read and insert operations needed by the schedule engine.
///
/// Implementations report missing records as [`StoreError::NotFound`].
/// Inserts are atomic: either every row is stored or none is.
pub trait ScheduleStore {
    /// Fetch a line by id.
    fn line(&self, id: LineId) -> Result<Line, StoreError>;

    /// Fetch a station by id.
    fn station(&self, id: StationId) -> Result<Station, StoreError>;

    /// Fetch a station's schedule entries.
    ///
    /// With `days` set, only entries whose label is in `days` are
    /// returned. With `None`, every entry is returned. Entries come back
    /// in registration order.
    fn entries(
        &self,
        station: StationId,
        days: Option<&[DayLabel]>,
    ) -> Result<Vec<ScheduleEntry>, StoreError>;

    /// Fetch the member stations of a location, in ascending id order.
    fn members(&self, location: &Location) -> Result<Vec<Station>, StoreError>;

    /// Store a batch of schedule entries for one station.
    fn insert_entries(
        &self,
        station: StationId,
        rows: Vec<NewScheduleEntry>,
    ) -> Result<Vec<ScheduleEntry>, StoreError>;

    /// Store a batch of one-off service dates for one station.
    fn insert_service_dates(
        &self,
        station: StationId,
        dates: Vec<DateTime<Utc>>,
    ) -> Result<Vec<ServiceDate>, StoreError>;

    /// Fetch a station's service dates in insertion order.
    fn service_dates(&self, station: StationId) -> Result<Vec<ServiceDate>, StoreError>;
}

impl<S: ScheduleStore + ?Sized> ScheduleStore for &S {
    fn line(&self, id: LineId) -> Result<Line, StoreError> {
        (**self).line(id)
    }

    fn station(&self, id: StationId) -> Result<Station, StoreError> {
        (**self).station(id)
    }

    fn entries(
        &self,
        station: StationId,
        days: Option<&[DayLabel]>,
    ) -> Result<Vec<ScheduleEntry>, StoreError> {
        (**self).entries(station, days)
    }

    fn members(&self, location: &Location) -> Result<Vec<Station>, StoreError> {
        (**self).members(location)
    }

    fn insert_entries(
        &self,
        station: StationId,
        rows: Vec<NewScheduleEntry>,
    ) -> Result<Vec<ScheduleEntry>, StoreError> {
        (**self).insert_entries(station, rows)
    }

    fn insert_service_dates(
        &self,
        station: StationId,
        dates: Vec<DateTime<Utc>>,
    ) -> Result<Vec<ServiceDate>, StoreError> {
        (**self).insert_service_dates(station, dates)
    }

    fn service_dates(&self, station: StationId) -> Result<Vec<ServiceDate>, StoreError> {
        (**self).service_dates(station)
    }
}
