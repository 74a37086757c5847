//! Domain types for the schedule service.
//!
//! Entities here are plain data records. Value types (day labels, times)
//! enforce their invariants at construction time; all query and mutation
//! logic lives in [`crate::schedule`] and [`crate::store`].

mod day;
mod entry;
mod ids;
mod line;
mod location;
mod station;
mod time;

pub use day::{DayLabel, InvalidDayLabel, MAX_LABEL_LEN, weekday_abbrev};
pub use entry::{NewScheduleEntry, ScheduleEntry, ServiceDate};
pub use ids::{EntryId, LineId, LocationId, StationId, UserId};
pub use line::Line;
pub use location::Location;
pub use station::Station;
pub use time::{
    ReferenceMoment, TimeError, earliest_time, format_time_of_day, latest_time,
    parse_time_of_day,
};
