//! In-memory store with catalog administration.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    DayLabel, EntryId, Line, LineId, Location, LocationId, NewScheduleEntry, ScheduleEntry,
    ServiceDate, Station, StationId, UserId,
};

use super::{ScheduleStore, StoreError};

/// Next identifier to hand out for each record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct NextIds {
    pub line: u64,
    pub station: u64,
    pub location: u64,
    pub entry: u64,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            line: 1,
            station: 1,
            location: 1,
            entry: 1,
        }
    }
}

/// All records, guarded together so multi-row writes are atomic.
#[derive(Debug, Default)]
pub(super) struct Tables {
    pub next: NextIds,
    pub lines: BTreeMap<LineId, Line>,
    pub stations: BTreeMap<StationId, Station>,
    pub entries: Vec<ScheduleEntry>,
    pub service_dates: Vec<ServiceDate>,
    pub locations: BTreeMap<LocationId, Location>,
}

impl Tables {
    fn require_station(&self, id: StationId) -> Result<&Station, StoreError> {
        self.stations
            .get(&id)
            .ok_or_else(|| StoreError::station_not_found(id))
    }
}

/// Thread-safe in-memory implementation of [`ScheduleStore`].
///
/// Readers never block each other. Every write takes the single write
/// lock for its whole duration, so a batch registration is never
/// visible half-done.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    pub(super) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    pub fn create_line(&self, name: impl Into<String>) -> Result<Line, StoreError> {
        let mut tables = self.write()?;
        let id = LineId(tables.next.line);
        tables.next.line += 1;

        let line = Line::new(id, name);
        tables.lines.insert(id, line.clone());
        info!(line = %id, name = %line.name, "Created line");
        Ok(line)
    }

    pub fn rename_line(&self, id: LineId, name: impl Into<String>) -> Result<Line, StoreError> {
        let mut tables = self.write()?;
        let line = tables
            .lines
            .get_mut(&id)
            .ok_or_else(|| StoreError::line_not_found(id))?;
        line.rename(name);
        Ok(line.clone())
    }

    pub fn lines(&self) -> Result<Vec<Line>, StoreError> {
        Ok(self.read()?.lines.values().cloned().collect())
    }

    // ------------------------------------------------------------------
    // Stations
    // ------------------------------------------------------------------

    /// Create a station on an existing line.
    pub fn create_station(
        &self,
        line: LineId,
        name: impl Into<String>,
    ) -> Result<Station, StoreError> {
        let mut tables = self.write()?;
        if !tables.lines.contains_key(&line) {
            return Err(StoreError::line_not_found(line));
        }

        let id = StationId(tables.next.station);
        tables.next.station += 1;

        let station = Station::new(id, name, line);
        tables.stations.insert(id, station.clone());
        info!(station = %id, line = %line, name = %station.name, "Created station");
        Ok(station)
    }

    pub fn stations(&self) -> Result<Vec<Station>, StoreError> {
        Ok(self.read()?.stations.values().cloned().collect())
    }

    pub fn stations_on_line(&self, line: LineId) -> Result<Vec<Station>, StoreError> {
        let tables = self.read()?;
        if !tables.lines.contains_key(&line) {
            return Err(StoreError::line_not_found(line));
        }
        Ok(tables
            .stations
            .values()
            .filter(|s| s.line == line)
            .cloned()
            .collect())
    }

    /// Delete a station together with everything it owns.
    ///
    /// Its schedule entries and service dates are removed, and it is
    /// dropped from every location's member set. Locations themselves
    /// are kept, even if they end up empty.
    pub fn delete_station(&self, id: StationId) -> Result<Station, StoreError> {
        let mut tables = self.write()?;
        let station = tables
            .stations
            .remove(&id)
            .ok_or_else(|| StoreError::station_not_found(id))?;

        let entries_before = tables.entries.len();
        tables.entries.retain(|e| e.station != id);
        let entries_removed = entries_before - tables.entries.len();

        tables.service_dates.retain(|d| d.station != id);

        let mut memberships_removed = 0;
        for location in tables.locations.values_mut() {
            if location.stations.remove(&id) {
                memberships_removed += 1;
            }
        }

        info!(
            station = %id,
            entries_removed,
            memberships_removed,
            "Deleted station"
        );
        Ok(station)
    }

    /// Qualified display name for a station, e.g. `R5/Jaures`.
    pub fn describe_station(&self, id: StationId) -> Result<String, StoreError> {
        let tables = self.read()?;
        let station = tables.require_station(id)?;
        let line = tables
            .lines
            .get(&station.line)
            .ok_or_else(|| StoreError::line_not_found(station.line))?;
        Ok(station.qualified_name(line))
    }

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    /// Create a location for `user` with the given member stations.
    ///
    /// Fails without creating anything if any station is missing.
    pub fn create_location(
        &self,
        user: UserId,
        name: impl Into<String>,
        stations: impl IntoIterator<Item = StationId>,
    ) -> Result<Location, StoreError> {
        let mut tables = self.write()?;
        let stations: Vec<StationId> = stations.into_iter().collect();
        for station in &stations {
            tables.require_station(*station)?;
        }

        let id = LocationId(tables.next.location);
        tables.next.location += 1;

        let location = Location::new(id, user, name, stations);
        tables.locations.insert(id, location.clone());
        info!(
            location = %id,
            user = %user,
            members = location.stations.len(),
            "Created location"
        );
        Ok(location)
    }

    pub fn location(&self, id: LocationId) -> Result<Location, StoreError> {
        self.read()?
            .locations
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::location_not_found(id))
    }

    /// Fetch a location only if it belongs to `user`.
    ///
    /// Another user's location is reported as not found.
    pub fn location_for_user(&self, user: UserId, id: LocationId) -> Result<Location, StoreError> {
        let location = self.location(id)?;
        if location.user != user {
            return Err(StoreError::location_not_found(id));
        }
        Ok(location)
    }

    pub fn locations_for_user(&self, user: UserId) -> Result<Vec<Location>, StoreError> {
        Ok(self
            .read()?
            .locations
            .values()
            .filter(|l| l.user == user)
            .cloned()
            .collect())
    }

    /// Delete a location. Member stations are untouched.
    pub fn delete_location(&self, id: LocationId) -> Result<Location, StoreError> {
        let mut tables = self.write()?;
        let location = tables
            .locations
            .remove(&id)
            .ok_or_else(|| StoreError::location_not_found(id))?;
        info!(location = %id, "Deleted location");
        Ok(location)
    }

    pub fn add_location_station(
        &self,
        id: LocationId,
        station: StationId,
    ) -> Result<Location, StoreError> {
        let mut tables = self.write()?;
        tables.require_station(station)?;
        let location = tables
            .locations
            .get_mut(&id)
            .ok_or_else(|| StoreError::location_not_found(id))?;
        location.stations.insert(station);
        Ok(location.clone())
    }

    pub fn remove_location_station(
        &self,
        id: LocationId,
        station: StationId,
    ) -> Result<Location, StoreError> {
        let mut tables = self.write()?;
        let location = tables
            .locations
            .get_mut(&id)
            .ok_or_else(|| StoreError::location_not_found(id))?;
        location.stations.remove(&station);
        Ok(location.clone())
    }

    /// Display form listing members, e.g. `Work (R1/Jaures, R5/Jaures)`.
    pub fn describe_location(&self, location: &Location) -> Result<String, StoreError> {
        let names = location
            .stations
            .iter()
            .map(|id| self.describe_station(*id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("{} ({})", location.name, names.join(", ")))
    }
}

impl ScheduleStore for MemoryStore {
    fn line(&self, id: LineId) -> Result<Line, StoreError> {
        self.read()?
            .lines
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::line_not_found(id))
    }

    fn station(&self, id: StationId) -> Result<Station, StoreError> {
        self.read()?.require_station(id).cloned()
    }

    fn entries(
        &self,
        station: StationId,
        days: Option<&[DayLabel]>,
    ) -> Result<Vec<ScheduleEntry>, StoreError> {
        let tables = self.read()?;
        tables.require_station(station)?;
        Ok(tables
            .entries
            .iter()
            .filter(|e| e.station == station)
            .filter(|e| days.is_none_or(|days| days.contains(&e.day)))
            .cloned()
            .collect())
    }

    fn members(&self, location: &Location) -> Result<Vec<Station>, StoreError> {
        let tables = self.read()?;
        // Membership is pruned on station delete, so a dangling id is
        // skipped rather than failing the whole location.
        Ok(location
            .stations
            .iter()
            .filter_map(|id| tables.stations.get(id).cloned())
            .collect())
    }

    fn insert_entries(
        &self,
        station: StationId,
        rows: Vec<NewScheduleEntry>,
    ) -> Result<Vec<ScheduleEntry>, StoreError> {
        let mut tables = self.write()?;
        tables.require_station(station)?;

        let mut stored = Vec::with_capacity(rows.len());
        for row in rows {
            let id = EntryId(tables.next.entry);
            tables.next.entry += 1;
            stored.push(ScheduleEntry {
                id,
                station,
                day: row.day,
                time: row.time,
            });
        }
        tables.entries.extend(stored.iter().cloned());

        info!(station = %station, count = stored.len(), "Registered schedule entries");
        Ok(stored)
    }

    fn insert_service_dates(
        &self,
        station: StationId,
        dates: Vec<DateTime<Utc>>,
    ) -> Result<Vec<ServiceDate>, StoreError> {
        let mut tables = self.write()?;
        tables.require_station(station)?;

        let stored: Vec<ServiceDate> = dates
            .into_iter()
            .map(|at| ServiceDate { station, at })
            .collect();
        tables.service_dates.extend(stored.iter().cloned());

        info!(station = %station, count = stored.len(), "Registered service dates");
        Ok(stored)
    }

    fn service_dates(&self, station: StationId) -> Result<Vec<ServiceDate>, StoreError> {
        let tables = self.read()?;
        tables.require_station(station)?;
        Ok(tables
            .service_dates
            .iter()
            .filter(|d| d.station == station)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Weekday};

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn row(day: DayLabel, t: NaiveTime) -> NewScheduleEntry {
        NewScheduleEntry { day, time: t }
    }

    fn store_with_station() -> (MemoryStore, Line, Station) {
        let store = MemoryStore::new();
        let line = store.create_line("R5").unwrap();
        let station = store.create_station(line.id, "Jaures").unwrap();
        (store, line, station)
    }

    #[test]
    fn ids_are_sequential_per_kind() {
        let store = MemoryStore::new();
        let a = store.create_line("R1").unwrap();
        let b = store.create_line("R5").unwrap();
        assert_eq!(a.id, LineId(1));
        assert_eq!(b.id, LineId(2));

        let s = store.create_station(a.id, "Jaures").unwrap();
        assert_eq!(s.id, StationId(1));
    }

    #[test]
    fn rename_line() {
        let (store, line, _) = store_with_station();
        let renamed = store.rename_line(line.id, "RER A").unwrap();
        assert_eq!(renamed.name, "RER A");
        assert_eq!(store.line(line.id).unwrap().name, "RER A");
    }

    #[test]
    fn rename_missing_line_is_not_found() {
        let store = MemoryStore::new();
        let err = store.rename_line(LineId(9), "X").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn station_on_missing_line_is_rejected() {
        let store = MemoryStore::new();
        let err = store.create_station(LineId(1), "Jaures").unwrap_err();
        assert_eq!(err.to_string(), "line 1 not found");
        assert!(store.stations().unwrap().is_empty());
    }

    #[test]
    fn stations_on_line_filters() {
        let store = MemoryStore::new();
        let r1 = store.create_line("R1").unwrap();
        let r5 = store.create_line("R5").unwrap();
        store.create_station(r1.id, "A").unwrap();
        store.create_station(r5.id, "B").unwrap();
        store.create_station(r5.id, "C").unwrap();

        let names: Vec<_> = store
            .stations_on_line(r5.id)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn describe_station_uses_line_name() {
        let (store, _, station) = store_with_station();
        assert_eq!(store.describe_station(station.id).unwrap(), "R5/Jaures");
    }

    #[test]
    fn entries_filter_by_labels() {
        let (store, _, station) = store_with_station();
        store
            .insert_entries(
                station.id,
                vec![
                    row(DayLabel::Weekdays, time(17, 6)),
                    row(DayLabel::Day(Weekday::Sat), time(9, 0)),
                    row(DayLabel::Daily, time(12, 0)),
                ],
            )
            .unwrap();

        let all = store.entries(station.id, None).unwrap();
        assert_eq!(all.len(), 3);

        let sat = store
            .entries(station.id, Some(&[DayLabel::Day(Weekday::Sat)]))
            .unwrap();
        assert_eq!(sat.len(), 1);
        assert_eq!(sat[0].time, time(9, 0));

        let none = store.entries(station.id, Some(&[])).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn entries_for_missing_station_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.entries(StationId(4), None).unwrap_err().is_not_found());
    }

    #[test]
    fn insert_into_missing_station_stores_nothing() {
        let (store, _, station) = store_with_station();
        let err = store
            .insert_entries(StationId(99), vec![row(DayLabel::Daily, time(1, 0))])
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.entries(station.id, None).unwrap().is_empty());
    }

    #[test]
    fn service_dates_roundtrip() {
        let (store, _, station) = store_with_station();
        let at = Utc.with_ymd_and_hms(2016, 1, 19, 9, 41, 0).unwrap();
        store.insert_service_dates(station.id, vec![at]).unwrap();

        let dates = store.service_dates(station.id).unwrap();
        assert_eq!(dates, vec![ServiceDate { station: station.id, at }]);
    }

    #[test]
    fn empty_service_dates() {
        let (store, _, station) = store_with_station();
        store.insert_service_dates(station.id, vec![]).unwrap();
        assert!(store.service_dates(station.id).unwrap().is_empty());
    }

    #[test]
    fn delete_station_cascades() {
        let (store, line, station) = store_with_station();
        let other = store.create_station(line.id, "Nation").unwrap();
        store
            .insert_entries(station.id, vec![row(DayLabel::Daily, time(8, 0))])
            .unwrap();
        store
            .insert_entries(other.id, vec![row(DayLabel::Daily, time(9, 0))])
            .unwrap();
        store
            .insert_service_dates(station.id, vec![Utc::now()])
            .unwrap();
        let location = store
            .create_location(UserId(1), "Work", [station.id, other.id])
            .unwrap();

        store.delete_station(station.id).unwrap();

        assert!(store.station(station.id).unwrap_err().is_not_found());
        assert_eq!(store.read().unwrap().entries.len(), 1);
        assert!(store.read().unwrap().service_dates.is_empty());

        let location = store.location(location.id).unwrap();
        assert!(!location.contains(station.id));
        assert!(location.contains(other.id));

        // The line and the other station are untouched
        assert!(store.line(line.id).is_ok());
        assert_eq!(store.entries(other.id, None).unwrap().len(), 1);
    }

    #[test]
    fn delete_location_keeps_stations() {
        let (store, _, station) = store_with_station();
        let location = store
            .create_location(UserId(1), "Home", [station.id])
            .unwrap();
        store.delete_location(location.id).unwrap();

        assert!(store.location(location.id).unwrap_err().is_not_found());
        assert!(store.station(station.id).is_ok());
    }

    #[test]
    fn location_with_missing_station_is_rejected() {
        let (store, _, station) = store_with_station();
        let err = store
            .create_location(UserId(1), "Work", [station.id, StationId(42)])
            .unwrap_err();
        assert_eq!(err.to_string(), "station 42 not found");
        assert!(store.locations_for_user(UserId(1)).unwrap().is_empty());
    }

    #[test]
    fn locations_are_scoped_to_user() {
        let (store, _, station) = store_with_station();
        let mine = store.create_location(UserId(1), "Work", [station.id]).unwrap();
        store.create_location(UserId(2), "Gym", [station.id]).unwrap();

        let listed = store.locations_for_user(UserId(1)).unwrap();
        assert_eq!(listed, vec![mine.clone()]);

        assert!(store.location_for_user(UserId(1), mine.id).is_ok());
        assert!(
            store
                .location_for_user(UserId(2), mine.id)
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn membership_edits() {
        let (store, line, station) = store_with_station();
        let other = store.create_station(line.id, "Nation").unwrap();
        let location = store.create_location(UserId(1), "Work", [station.id]).unwrap();

        let location = store.add_location_station(location.id, other.id).unwrap();
        assert_eq!(location.stations.len(), 2);

        let location = store
            .remove_location_station(location.id, station.id)
            .unwrap();
        assert!(!location.contains(station.id));

        assert!(
            store
                .add_location_station(location.id, StationId(77))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn members_in_id_order() {
        let (store, line, first) = store_with_station();
        let second = store.create_station(line.id, "Nation").unwrap();
        let location = store
            .create_location(UserId(1), "Work", [second.id, first.id])
            .unwrap();

        let members: Vec<_> = store
            .members(&location)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(members, vec![first.id, second.id]);
    }

    #[test]
    fn describe_location_lists_members() {
        let store = MemoryStore::new();
        let r1 = store.create_line("R1").unwrap();
        let r5 = store.create_line("R5").unwrap();
        let a = store.create_station(r1.id, "Saint-Germain-en-Laye").unwrap();
        let b = store.create_station(r5.id, "Saint-Germain-en-Laye").unwrap();
        let location = store.create_location(UserId(1), "Work", [a.id, b.id]).unwrap();

        assert_eq!(
            store.describe_location(&location).unwrap(),
            "Work (R1/Saint-Germain-en-Laye, R5/Saint-Germain-en-Laye)"
        );
    }
}
