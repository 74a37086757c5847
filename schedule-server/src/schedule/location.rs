//! Merged departures across the stations of a saved location.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Line, LineId, Location, ReferenceMoment, ScheduleEntry, Station};
use crate::store::{ScheduleStore, StoreError};

use super::classify::{DayClassifier, HolidayCalendar, NoHolidays};
use super::station::StationResolver;

/// One departure in a merged location board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub entry: ScheduleEntry,
    pub station: Station,
    pub line: Line,
}

/// Resolves every member station of a location and merges the results.
pub struct LocationResolver<'a, S: ScheduleStore + ?Sized, H = NoHolidays> {
    store: &'a S,
    stations: StationResolver<'a, S, H>,
}

impl<'a, S: ScheduleStore + ?Sized, H: HolidayCalendar> LocationResolver<'a, S, H> {
    pub fn new(store: &'a S, classifier: &'a DayClassifier<H>) -> Self {
        Self {
            store,
            stations: StationResolver::new(store, classifier),
        }
    }

    /// Departures from all of `location`'s stations, earliest first.
    ///
    /// Each member station is resolved on its own (see
    /// [`StationResolver::resolve`]); the results are concatenated in
    /// member order and stably sorted by time of day, so equal times
    /// keep member order. At most `limit` departures are returned.
    ///
    /// A location without members yields an empty board.
    pub fn resolve(
        &self,
        location: &Location,
        reference: Option<ReferenceMoment>,
        limit: Option<usize>,
    ) -> Result<Vec<Departure>, StoreError> {
        let members = self.store.members(location)?;
        let mut lines: HashMap<LineId, Line> = HashMap::new();
        let mut merged = Vec::new();

        for station in members {
            let line = match lines.get(&station.line) {
                Some(line) => line.clone(),
                None => {
                    let line = self.store.line(station.line)?;
                    lines.insert(line.id, line.clone());
                    line
                }
            };

            let entries = self.stations.resolve(&station, reference)?;
            merged.extend(entries.into_iter().map(|entry| Departure {
                entry,
                station: station.clone(),
                line: line.clone(),
            }));
        }

        merged.sort_by_key(|d| d.entry.time);
        if let Some(limit) = limit {
            merged.truncate(limit);
        }

        debug!(
            location = %location.id,
            members = location.stations.len(),
            count = merged.len(),
            "Resolved location departures"
        );
        Ok(merged)
    }
}
