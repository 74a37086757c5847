//! Recurring schedule entries and one-off service dates.

use std::fmt;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::day::DayLabel;
use super::ids::{EntryId, StationId};
use super::time::format_time_of_day;

/// One recurring departure: a station, a day label and a time of day.
///
/// Many entries may share a day label. Storage order carries no meaning;
/// queries order entries by time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: EntryId,
    pub station: StationId,
    pub day: DayLabel,
    pub time: NaiveTime,
}

impl ScheduleEntry {
    /// Short form used in listings, e.g. `(weekdays) 17:06`.
    pub fn day_and_time(&self) -> String {
        format!("({}) {}", self.day, format_time_of_day(self.time))
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.station,
            self.day,
            format_time_of_day(self.time)
        )
    }
}

/// A schedule entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleEntry {
    pub day: DayLabel,
    pub time: NaiveTime,
}

/// A one-off service at an absolute moment, outside the weekly pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDate {
    pub station: StationId,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_and_time_form() {
        let entry = ScheduleEntry {
            id: EntryId(1),
            station: StationId(2),
            day: DayLabel::Weekdays,
            time: NaiveTime::from_hms_opt(17, 6, 0).unwrap(),
        };
        assert_eq!(entry.day_and_time(), "(weekdays) 17:06");
        assert_eq!(entry.to_string(), "2/weekdays/17:06");
    }

    #[test]
    fn seconds_survive_serialization() {
        let entry = ScheduleEntry {
            id: EntryId(1),
            station: StationId(2),
            day: DayLabel::Daily,
            time: NaiveTime::from_hms_opt(7, 10, 30).unwrap(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: ScheduleEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
