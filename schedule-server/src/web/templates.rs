//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{Line, ScheduleEntry, Station, format_time_of_day};
use crate::schedule::Departure;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page listing the catalog.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub stations: Vec<StationView>,
}

/// Departure board for a station or a location.
#[derive(Template)]
#[template(path = "board.html")]
pub struct BoardTemplate {
    pub title: String,
    pub reference: Option<String>,
    pub rows: Vec<BoardRowView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Station view model for the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationView {
    pub id: u64,
    pub display: String,
}

impl StationView {
    pub fn from_station(station: &Station, line: &Line) -> Self {
        Self {
            id: station.id.get(),
            display: station.qualified_name(line),
        }
    }
}

/// One row of a departure board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRowView {
    pub time: String,
    pub day: String,

    /// Qualified station name, empty on a single-station board
    pub station: String,
}

impl BoardRowView {
    /// Row for a single station's board.
    pub fn from_entry(entry: &ScheduleEntry) -> Self {
        Self {
            time: format_time_of_day(entry.time),
            day: entry.day.to_string(),
            station: String::new(),
        }
    }

    /// Row for a merged location board.
    pub fn from_departure(departure: &Departure) -> Self {
        Self {
            time: format_time_of_day(departure.entry.time),
            day: departure.entry.day.to_string(),
            station: departure.station.qualified_name(&departure.line),
        }
    }

    pub fn has_station(&self) -> bool {
        !self.station.is_empty()
    }
}

impl BoardTemplate {
    /// Whether any row names its station (location boards).
    pub fn shows_stations(&self) -> bool {
        self.rows.iter().any(BoardRowView::has_station)
    }
}
