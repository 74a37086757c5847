//! Caching layer for merged location boards.
//!
//! Resolving a location fans out over every member station, so repeated
//! requests for the same board are served from a short-lived cache.
//! References are keyed at minute precision, matching the resolution the
//! schedule filter itself uses.
//!
//! Any write to the store can change a board, so writers must call
//! [`BoardCache::invalidate_all`]. Each call starts a new generation, and
//! boards are keyed by the generation they were resolved in, so a board
//! read before a write is never served after it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDateTime;
use moka::future::Cache as MokaCache;

use crate::domain::{Location, LocationId, ReferenceMoment};
use crate::schedule::{DayClassifier, Departure, HolidayCalendar, LocationResolver};
use crate::store::{ScheduleStore, StoreError};

/// Cache key for boards: (generation, location, minute-floored reference, limit).
type BoardKey = (u64, LocationId, Option<NaiveDateTime>, Option<usize>);

/// Cached board entry.
pub type BoardEntry = Arc<Vec<Departure>>;

/// Configuration for the board cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCacheConfig {
    /// TTL for cached boards.
    pub ttl: Duration,

    /// Maximum number of cached boards.
    pub max_capacity: u64,
}

impl Default for BoardCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Cache of resolved location boards.
pub struct BoardCache {
    boards: MokaCache<BoardKey, BoardEntry>,
    generation: AtomicU64,
}

impl BoardCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &BoardCacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            boards,
            generation: AtomicU64::new(0),
        }
    }

    fn key(
        generation: u64,
        location: LocationId,
        reference: Option<ReferenceMoment>,
        limit: Option<usize>,
    ) -> BoardKey {
        let reference =
            reference.map(|r| NaiveDateTime::new(r.date(), r.minute_floor()));
        (generation, location, reference, limit)
    }

    /// Resolve a location board, using the cache if available.
    pub async fn departures<S, H>(
        &self,
        store: &S,
        classifier: &DayClassifier<H>,
        location: &Location,
        reference: Option<ReferenceMoment>,
        limit: Option<usize>,
    ) -> Result<BoardEntry, StoreError>
    where
        S: ScheduleStore + ?Sized,
        H: HolidayCalendar,
    {
        // Read before resolving: a write that lands mid-resolve bumps the
        // generation, and this board is filed under the old one.
        let generation = self.generation.load(Ordering::Acquire);
        let key = Self::key(generation, location.id, reference, limit);

        if let Some(cached) = self.boards.get(&key).await {
            return Ok(cached);
        }

        let board = LocationResolver::new(store, classifier).resolve(location, reference, limit)?;
        let entry = Arc::new(board);
        self.boards.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// Number of cached boards (approximate, for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.boards.entry_count()
    }

    /// Invalidate all cached boards.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.boards.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::domain::{
        DayLabel, Line, LineId, NewScheduleEntry, ScheduleEntry, ServiceDate, Station, StationId,
        UserId,
    };
    use crate::schedule::register_daily_times;
    use crate::store::MemoryStore;
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn reference(h: u32, m: u32, s: u32) -> Option<ReferenceMoment> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        Some(ReferenceMoment::new(date, NaiveTime::from_hms_opt(h, m, s).unwrap()))
    }

    fn setup() -> (MemoryStore, Location) {
        let store = MemoryStore::new();
        let line = store.create_line("R5").unwrap();
        let station = store.create_station(line.id, "Jaures").unwrap();
        register_daily_times(&store, station.id, &[DayLabel::Daily], &[t(8, 0), t(9, 0)])
            .unwrap();
        let location = store
            .create_location(UserId(1), "Home", [station.id])
            .unwrap();
        (store, location)
    }

    #[test]
    fn default_config() {
        let config = BoardCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_capacity, 1000);
    }

    #[test]
    fn key_ignores_seconds() {
        let a = BoardCache::key(0, LocationId(1), reference(8, 30, 0), None);
        let b = BoardCache::key(0, LocationId(1), reference(8, 30, 59), None);
        let c = BoardCache::key(0, LocationId(1), reference(8, 31, 0), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn key_includes_limit() {
        let a = BoardCache::key(0, LocationId(1), None, Some(1));
        let b = BoardCache::key(0, LocationId(1), None, Some(2));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn serves_cached_board_until_invalidated() {
        let (store, location) = setup();
        let classifier = DayClassifier::new();
        let cache = BoardCache::new(&BoardCacheConfig::default());

        let first = cache
            .departures(&store, &classifier, &location, reference(8, 30, 0), None)
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        // A new entry is invisible until the cache is cleared
        let station = *location.stations.iter().next().unwrap();
        register_daily_times(&store, station, &[DayLabel::Daily], &[t(10, 0)]).unwrap();
        let cached = cache
            .departures(&store, &classifier, &location, reference(8, 30, 15), None)
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&first, &cached));

        cache.invalidate_all();
        let fresh = cache
            .departures(&store, &classifier, &location, reference(8, 30, 0), None)
            .await
            .unwrap();
        assert_eq!(fresh.len(), 2);
    }

    #[tokio::test]
    async fn dangling_members_give_empty_board() {
        let store = MemoryStore::new();
        let classifier = DayClassifier::new();
        let cache = BoardCache::new(&BoardCacheConfig::default());
        let line = store.create_line("R5").unwrap();
        let station = store.create_station(line.id, "Jaures").unwrap();
        // Never saved, and its only station is deleted below
        let location = Location::new(LocationId(7), UserId(1), "Ghost", [station.id]);
        store.delete_station(station.id).unwrap();

        let board = cache
            .departures(&store, &classifier, &location, None, None)
            .await
            .unwrap();
        assert!(board.is_empty());
        cache.boards.run_pending_tasks().await;
        assert_eq!(cache.entry_count(), 1);
    }

    /// Commits a write, and clears the cache, while the first entry read
    /// is in flight.
    struct WriteDuringRead<'a> {
        inner: &'a MemoryStore,
        cache: &'a BoardCache,
        written: Cell<bool>,
    }

    impl ScheduleStore for WriteDuringRead<'_> {
        fn line(&self, id: LineId) -> Result<Line, StoreError> {
            self.inner.line(id)
        }

        fn station(&self, id: StationId) -> Result<Station, StoreError> {
            self.inner.station(id)
        }

        fn entries(
            &self,
            station: StationId,
            days: Option<&[DayLabel]>,
        ) -> Result<Vec<ScheduleEntry>, StoreError> {
            let entries = self.inner.entries(station, days)?;
            if !self.written.replace(true) {
                register_daily_times(self.inner, station, &[DayLabel::Daily], &[t(10, 0)])?;
                self.cache.invalidate_all();
            }
            Ok(entries)
        }

        fn members(&self, location: &Location) -> Result<Vec<Station>, StoreError> {
            self.inner.members(location)
        }

        fn insert_entries(
            &self,
            station: StationId,
            rows: Vec<NewScheduleEntry>,
        ) -> Result<Vec<ScheduleEntry>, StoreError> {
            self.inner.insert_entries(station, rows)
        }

        fn insert_service_dates(
            &self,
            station: StationId,
            dates: Vec<DateTime<Utc>>,
        ) -> Result<Vec<ServiceDate>, StoreError> {
            self.inner.insert_service_dates(station, dates)
        }

        fn service_dates(&self, station: StationId) -> Result<Vec<ServiceDate>, StoreError> {
            self.inner.service_dates(station)
        }
    }

    #[tokio::test]
    async fn board_resolved_before_write_is_not_served_after_it() {
        let (store, location) = setup();
        let classifier = DayClassifier::new();
        let cache = BoardCache::new(&BoardCacheConfig::default());
        let racing = WriteDuringRead {
            inner: &store,
            cache: &cache,
            written: Cell::new(false),
        };

        let during = cache
            .departures(&racing, &classifier, &location, reference(8, 30, 0), None)
            .await
            .unwrap();
        assert_eq!(during.len(), 1);

        let after = cache
            .departures(&store, &classifier, &location, reference(8, 30, 0), None)
            .await
            .unwrap();
        assert_eq!(after.len(), 2);
    }
}
