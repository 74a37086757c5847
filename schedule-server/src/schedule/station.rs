//! Upcoming departures for a single station.

use tracing::debug;

use crate::domain::{ReferenceMoment, ScheduleEntry, Station};
use crate::store::{ScheduleStore, StoreError};

use super::classify::{DayClassifier, DayQuery, HolidayCalendar, NoHolidays, Selection};
use super::compare::upcoming;

/// Resolves a station's schedule for a reference moment.
pub struct StationResolver<'a, S: ScheduleStore + ?Sized, H = NoHolidays> {
    store: &'a S,
    classifier: &'a DayClassifier<H>,
}

impl<'a, S: ScheduleStore + ?Sized, H: HolidayCalendar> StationResolver<'a, S, H> {
    pub fn new(store: &'a S, classifier: &'a DayClassifier<H>) -> Self {
        Self { store, classifier }
    }

    /// Departures from `station` at or after `reference`, earliest first.
    ///
    /// Without a reference, every entry of the station is returned
    /// unfiltered, in registration order.
    ///
    /// With a reference, the day classifier picks the entries of the
    /// first matching tier and those before the reference's time of day
    /// (at minute precision) are dropped.
    ///
    /// NOTE: if no tier matches (no exact, bucket or daily entries), the
    /// day filter is skipped entirely and the station's full entry set is
    /// used instead of nothing. Callers relying on an empty result for
    /// "no service today" will not get one.
    pub fn resolve(
        &self,
        station: &Station,
        reference: Option<ReferenceMoment>,
    ) -> Result<Vec<ScheduleEntry>, StoreError> {
        let Some(reference) = reference else {
            return self.store.entries(station.id, None);
        };

        let query = DayQuery::Date(reference.date());
        let labels = self.classifier.candidate_labels(&query);
        let candidates = self.store.entries(station.id, Some(&labels))?;

        let day_entries = match self.classifier.select(&query, candidates) {
            Selection::Matched { entries, .. } => entries,
            Selection::NoMatch => {
                debug!(station = %station.id, "No day tier matched, using all entries");
                self.store.entries(station.id, None)?
            }
        };

        let mut result = upcoming(day_entries, reference.minute_floor(), |e| e.time);
        result.sort_by_key(|e| e.time);

        debug!(
            station = %station.id,
            reference = %reference,
            count = result.len(),
            "Resolved station departures"
        );
        Ok(result)
    }

    /// Entries for an explicit day label, without any date math.
    ///
    /// The same tier fallback applies, starting from `label`.
    pub fn resolve_label(
        &self,
        station: &Station,
        query: DayQuery,
    ) -> Result<Vec<ScheduleEntry>, StoreError> {
        let labels = self.classifier.candidate_labels(&query);
        let candidates = self.store.entries(station.id, Some(&labels))?;

        let mut result = match self.classifier.select(&query, candidates) {
            Selection::Matched { entries, .. } => entries,
            Selection::NoMatch => self.store.entries(station.id, None)?,
        };
        result.sort_by_key(|e| e.time);
        Ok(result)
    }
}
