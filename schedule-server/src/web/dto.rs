//! Data transfer objects for web requests and responses.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DayLabel, InvalidDayLabel, Line, LineId, Location, LocationId, ReferenceMoment,
    ScheduleEntry, ServiceDate, Station, StationId, TimeError, UserId, format_time_of_day,
    parse_time_of_day,
};
use crate::schedule::Departure;

// ============================================================================
// Lines
// ============================================================================

/// Request to create or rename a line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    /// Line name (e.g., "R5")
    pub name: String,
}

/// A line.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LineResult {
    pub id: LineId,
    pub name: String,
}

impl LineResult {
    pub fn from_line(line: &Line) -> Self {
        Self {
            id: line.id,
            name: line.name.clone(),
        }
    }
}

/// Response listing lines.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<LineResult>,
}

// ============================================================================
// Stations
// ============================================================================

/// Request to create a station.
#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    /// Line the station belongs to
    pub line: LineId,

    /// Station name
    pub name: String,
}

/// Optional filter for station listings.
#[derive(Debug, Default, Deserialize)]
pub struct StationListQuery {
    /// Only stations on this line
    pub line: Option<LineId>,
}

/// A station.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StationResult {
    pub id: StationId,
    pub name: String,
    pub line: LineId,

    /// Display form, e.g. "R5/Jaures"
    pub display: String,
}

impl StationResult {
    pub fn from_station(station: &Station, line: &Line) -> Self {
        Self {
            id: station.id,
            name: station.name.clone(),
            line: station.line,
            display: station.qualified_name(line),
        }
    }
}

/// Response listing stations.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResult>,
}

// ============================================================================
// Schedule entries
// ============================================================================

/// Request to register recurring times for a station.
///
/// Every day is combined with every time.
#[derive(Debug, Deserialize)]
pub struct RegisterTimesRequest {
    /// Day labels (e.g., "Mon", "weekdays", "daily")
    pub days: Vec<String>,

    /// Times of day in HH:MM format
    pub times: Vec<String>,
}

/// A field of a registration request failed to parse.
#[derive(Debug, thiserror::Error)]
pub enum RegisterTimesError {
    #[error("{0}")]
    Day(#[from] InvalidDayLabel),

    #[error("invalid time {value:?}: {source}")]
    Time { value: String, source: TimeError },
}

impl RegisterTimesRequest {
    /// Parse the labels and times, failing on the first bad value.
    pub fn parse(&self) -> Result<(Vec<DayLabel>, Vec<NaiveTime>), RegisterTimesError> {
        let days = self
            .days
            .iter()
            .map(|d| DayLabel::parse(d))
            .collect::<Result<Vec<_>, _>>()?;
        let times = self
            .times
            .iter()
            .map(|t| {
                parse_time_of_day(t).map_err(|source| RegisterTimesError::Time {
                    value: t.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((days, times))
    }
}

/// A schedule entry.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EntryResult {
    pub id: crate::domain::EntryId,
    pub station: StationId,
    pub day: DayLabel,

    /// Time of day (HH:MM, or HH:MM:SS when seconds are set)
    pub time: String,

    /// Listing form, e.g. "(weekdays) 17:06"
    pub day_and_time: String,
}

impl EntryResult {
    pub fn from_entry(entry: &ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            station: entry.station,
            day: entry.day.clone(),
            time: format_time_of_day(entry.time),
            day_and_time: entry.day_and_time(),
        }
    }
}

/// Response for a station's times.
#[derive(Debug, Serialize)]
pub struct StationTimesResponse {
    pub station: StationResult,

    /// Reference used, or `None` for the unfiltered listing
    pub reference: Option<String>,

    pub times: Vec<EntryResult>,
}

/// Response for a registration.
#[derive(Debug, Serialize)]
pub struct RegisterTimesResponse {
    pub created: Vec<EntryResult>,
}

// ============================================================================
// Service dates
// ============================================================================

/// Request to register one-off service dates.
#[derive(Debug, Deserialize)]
pub struct RegisterDatesRequest {
    /// RFC 3339 timestamps
    pub dates: Vec<DateTime<Utc>>,
}

/// A one-off service date.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ServiceDateResult {
    pub station: StationId,
    pub at: DateTime<Utc>,
}

impl ServiceDateResult {
    pub fn from_date(date: &ServiceDate) -> Self {
        Self {
            station: date.station,
            at: date.at,
        }
    }
}

/// Response listing service dates.
#[derive(Debug, Serialize)]
pub struct ServiceDatesResponse {
    pub dates: Vec<ServiceDateResult>,
}

// ============================================================================
// Locations
// ============================================================================

/// Request to create a location.
#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,

    /// Member station ids
    #[serde(default)]
    pub stations: Vec<StationId>,
}

/// Request to add a member station.
#[derive(Debug, Deserialize)]
pub struct LocationStationRequest {
    pub station: StationId,
}

/// A saved location.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LocationResult {
    pub id: LocationId,
    pub user: UserId,
    pub name: String,
    pub stations: Vec<StationId>,

    /// Display form, e.g. "Work (R1/Jaures, R5/Jaures)"
    pub display: String,
}

impl LocationResult {
    pub fn from_location(location: &Location, display: String) -> Self {
        Self {
            id: location.id,
            user: location.user,
            name: location.name.clone(),
            stations: location.stations.iter().copied().collect(),
            display,
        }
    }
}

/// Response listing a user's locations.
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<LocationResult>,
}

/// One departure on a location board.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DepartureResult {
    pub entry: crate::domain::EntryId,
    pub time: String,
    pub day: DayLabel,
    pub station: StationId,
    pub station_name: String,
    pub line: LineId,
    pub line_name: String,
}

impl DepartureResult {
    pub fn from_departure(departure: &Departure) -> Self {
        Self {
            entry: departure.entry.id,
            time: format_time_of_day(departure.entry.time),
            day: departure.entry.day.clone(),
            station: departure.station.id,
            station_name: departure.station.name.clone(),
            line: departure.line.id,
            line_name: departure.line.name.clone(),
        }
    }
}

/// Response for a location board.
#[derive(Debug, Serialize)]
pub struct LocationTimesResponse {
    pub location: LocationId,
    pub reference: Option<String>,
    pub departures: Vec<DepartureResult>,
}

/// Format a reference for responses.
pub fn reference_label(reference: Option<ReferenceMoment>) -> Option<String> {
    reference.map(|r| r.to_string())
}

// ============================================================================
// Errors
// ============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
