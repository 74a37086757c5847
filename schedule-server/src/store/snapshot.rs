//! JSON snapshots of the in-memory store.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::{Line, Location, ScheduleEntry, ServiceDate, Station};

use super::error::StoreError;
use super::memory::{MemoryStore, NextIds, Tables};

/// Serialized form of every record in a [`MemoryStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    next: NextIds,
    pub lines: Vec<Line>,
    pub stations: Vec<Station>,
    pub entries: Vec<ScheduleEntry>,
    pub service_dates: Vec<ServiceDate>,
    pub locations: Vec<Location>,
}

impl Snapshot {
    fn capture(tables: &Tables) -> Self {
        Self {
            next: tables.next,
            lines: tables.lines.values().cloned().collect(),
            stations: tables.stations.values().cloned().collect(),
            entries: tables.entries.clone(),
            service_dates: tables.service_dates.clone(),
            locations: tables.locations.values().cloned().collect(),
        }
    }

    fn into_tables(self) -> Tables {
        Tables {
            next: self.next,
            lines: self.lines.into_iter().map(|l| (l.id, l)).collect(),
            stations: self.stations.into_iter().map(|s| (s.id, s)).collect(),
            entries: self.entries,
            service_dates: self.service_dates,
            locations: self.locations.into_iter().map(|l| (l.id, l)).collect(),
        }
    }
}

impl MemoryStore {
    /// Capture every record.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let tables = self.read()?;
        Ok(Snapshot::capture(&tables))
    }

    /// Build a store from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::from_tables(snapshot.into_tables())
    }

    /// Write the store to `path` as pretty JSON.
    ///
    /// Creates parent directories if they don't exist. The file is written
    /// to a temporary sibling and renamed into place, so a reader never
    /// sees a partial snapshot.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        let snapshot = self.snapshot()?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Snapshot {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| StoreError::Snapshot {
            message: format!("failed to serialize snapshot: {}", e),
        })?;

        let mut file = NamedTempFile::new_in(parent).map_err(|e| StoreError::Snapshot {
            message: format!("failed to create snapshot file: {}", e),
        })?;
        file.write_all(json.as_bytes()).map_err(|e| StoreError::Snapshot {
            message: format!("failed to write snapshot file: {}", e),
        })?;
        file.persist(path).map_err(|e| StoreError::Snapshot {
            message: format!("failed to replace snapshot file: {}", e.error),
        })?;

        Ok(())
    }

    /// Load a store from `path`.
    ///
    /// A missing file yields an empty store; an unreadable or malformed
    /// one is an error.
    pub fn load_snapshot(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            info!(path = %path.display(), "No snapshot found, starting empty");
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::Snapshot {
            message: format!("failed to read snapshot file: {}", e),
        })?;
        let snapshot: Snapshot =
            serde_json::from_str(&contents).map_err(|e| StoreError::Snapshot {
                message: format!("failed to parse snapshot: {}", e),
            })?;

        info!(
            path = %path.display(),
            stations = snapshot.stations.len(),
            entries = snapshot.entries.len(),
            "Loaded snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DayLabel, NewScheduleEntry, UserId};
    use crate::store::ScheduleStore;
    use chrono::NaiveTime;
    use tempfile::tempdir;

    fn populated() -> MemoryStore {
        let store = MemoryStore::new();
        let line = store.create_line("R5").unwrap();
        let station = store.create_station(line.id, "Jaures").unwrap();
        store
            .insert_entries(
                station.id,
                vec![NewScheduleEntry {
                    day: DayLabel::Weekdays,
                    time: NaiveTime::from_hms_opt(17, 6, 30).unwrap(),
                }],
            )
            .unwrap();
        store
            .create_location(UserId(1), "Work", [station.id])
            .unwrap();
        store
    }

    #[test]
    fn save_and_load_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schedule.json");

        let store = populated();
        store.save_snapshot(&path).unwrap();

        let loaded = MemoryStore::load_snapshot(&path).unwrap();
        assert_eq!(loaded.snapshot().unwrap(), store.snapshot().unwrap());
    }

    #[test]
    fn id_counters_survive_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schedule.json");

        populated().save_snapshot(&path).unwrap();
        let loaded = MemoryStore::load_snapshot(&path).unwrap();

        let line = loaded.create_line("R1").unwrap();
        assert_eq!(line.id.get(), 2);
    }

    #[test]
    fn missing_snapshot_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::load_snapshot(&dir.path().join("absent.json")).unwrap();
        assert_eq!(store.snapshot().unwrap(), Snapshot::default());
    }

    #[test]
    fn malformed_snapshot_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = MemoryStore::load_snapshot(&path).unwrap_err();
        assert!(err.to_string().starts_with("snapshot error: failed to parse"));
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        std::fs::write(&path, "stale").unwrap();

        let store = populated();
        store.save_snapshot(&path).unwrap();

        let loaded = MemoryStore::load_snapshot(&path).unwrap();
        assert_eq!(loaded.snapshot().unwrap(), store.snapshot().unwrap());
        // Only the snapshot itself is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn unwritable_path_is_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = populated()
            .save_snapshot(&blocker.join("schedule.json"))
            .unwrap_err();
        assert!(err.to_string().starts_with("snapshot error: "));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("schedule.json");

        populated().save_snapshot(&path).unwrap();
        assert!(path.exists());
    }
}
