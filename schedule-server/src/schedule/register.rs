//! Batch registration of schedules.

use chrono::{DateTime, NaiveTime, Utc};

use crate::domain::{DayLabel, NewScheduleEntry, ScheduleEntry, ServiceDate, StationId};
use crate::store::{ScheduleStore, StoreError};

/// Register every combination of `days` and `times` for a station.
///
/// Two days and three times create six entries. The whole cross product
/// is handed to the store as one atomic insert.
pub fn register_daily_times<S: ScheduleStore + ?Sized>(
    store: &S,
    station: StationId,
    days: &[DayLabel],
    times: &[NaiveTime],
) -> Result<Vec<ScheduleEntry>, StoreError> {
    let mut rows = Vec::with_capacity(days.len() * times.len());
    for day in days {
        for time in times {
            rows.push(NewScheduleEntry {
                day: day.clone(),
                time: *time,
            });
        }
    }
    store.insert_entries(station, rows)
}

/// Register one-off service dates for a station.
pub fn register_dates<S: ScheduleStore + ?Sized>(
    store: &S,
    station: StationId,
    dates: &[DateTime<Utc>],
) -> Result<Vec<ServiceDate>, StoreError> {
    store.insert_service_dates(station, dates.to_vec())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::store::MemoryStore;
    use proptest::prelude::*;

    proptest! {
        /// Registration always creates len(days) * len(times) entries
        #[test]
        fn creates_cross_product(
            days in prop::collection::vec("[A-Za-z]{1,10}", 0..5),
            minutes in prop::collection::vec(0u32..1440, 0..6),
        ) {
            let store = MemoryStore::new();
            let line = store.create_line("L").unwrap();
            let station = store.create_station(line.id, "S").unwrap();

            let days: Vec<DayLabel> = days.iter().map(|d| DayLabel::parse(d).unwrap()).collect();
            let times: Vec<NaiveTime> = minutes
                .iter()
                .map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap())
                .collect();

            let created = register_daily_times(&store, station.id, &days, &times).unwrap();
            prop_assert_eq!(created.len(), days.len() * times.len());
            prop_assert_eq!(store.entries(station.id, None).unwrap().len(), days.len() * times.len());
        }
    }
}
