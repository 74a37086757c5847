//! Schedule resolution.
//!
//! Given a station (or a saved location) and an optional reference
//! moment, work out which departures are still to come:
//!
//! 1. **Classify**: pick the applicable day label via the tiered fallback
//!    (holiday, exact day, weekdays/weekends, daily).
//! 2. **Filter**: drop entries earlier than the reference time of day.
//! 3. **Merge**: for locations, combine every member station's departures
//!    into one board sorted by time.

mod classify;
mod compare;
mod location;
mod register;
mod station;

pub use classify::{DayClassifier, DayQuery, HolidayCalendar, NoHolidays, Selection, TIERS, Tier};
pub use compare::{times_gte, upcoming};
pub use location::{Departure, LocationResolver};
pub use register::{register_daily_times, register_dates};
pub use station::StationResolver;
