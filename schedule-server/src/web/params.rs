//! Query parameter parsing for schedule lookups.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{ReferenceMoment, TimeError, parse_time_of_day};

/// Datetime layouts accepted for `date`, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Error parsing a reference moment from query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("invalid date {0:?}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM")]
    Date(String),

    #[error("invalid time {value:?}: {source}")]
    Time { value: String, source: TimeError },
}

/// `?date=&time=` query for station and location boards.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceQuery {
    /// Date or datetime. Present but empty means "now".
    pub date: Option<String>,

    /// Time of day (HH:MM), overriding the date's hour and minute.
    pub time: Option<String>,
}

impl ReferenceQuery {
    /// Resolve the query into a reference moment.
    ///
    /// `now` stands in for the current local time.
    pub fn reference(&self, now: NaiveDateTime) -> Result<Option<ReferenceMoment>, ReferenceError> {
        parse_reference(self.date.as_deref(), self.time.as_deref(), now)
    }
}

/// Build the reference moment for a lookup.
///
/// - no `date` and no `time`: `None` (unfiltered listing)
/// - `date` with a value: that date, at midnight unless it carries a time
/// - `date` present but empty: `now`
/// - `time`: replaces hour and minute, on `now`'s date when no date is given
pub fn parse_reference(
    date: Option<&str>,
    time: Option<&str>,
    now: NaiveDateTime,
) -> Result<Option<ReferenceMoment>, ReferenceError> {
    let mut moment = match date.map(str::trim) {
        Some("") => Some(now),
        Some(value) => Some(parse_date_param(value)?),
        None => None,
    };

    if let Some(value) = time.map(str::trim).filter(|v| !v.is_empty()) {
        let t = parse_time_of_day(value).map_err(|source| ReferenceError::Time {
            value: value.to_string(),
            source,
        })?;
        let base = moment.unwrap_or(now);
        moment = Some(NaiveDateTime::new(
            base.date(),
            replace_hour_minute(base.time(), t),
        ));
    }

    Ok(moment.map(ReferenceMoment::at))
}

fn parse_date_param(value: &str) -> Result<NaiveDateTime, ReferenceError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ReferenceError::Date(value.to_string()))
}

fn replace_hour_minute(base: NaiveTime, with: NaiveTime) -> NaiveTime {
    base.with_hour(with.hour())
        .and_then(|t| t.with_minute(with.minute()))
        .unwrap_or(with)
}

/// `?limit=` for location boards, alongside the reference.
#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub date: Option<String>,
    pub time: Option<String>,
    pub limit: Option<usize>,
}

impl BoardQuery {
    pub fn reference_query(&self) -> ReferenceQuery {
        ReferenceQuery {
            date: self.date.clone(),
            time: self.time.clone(),
        }
    }
}
