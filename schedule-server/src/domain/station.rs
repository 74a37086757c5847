//! Stations and their display form.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{LineId, StationId};
use super::line::Line;

/// A stop on exactly one line.
///
/// A station owns its schedule entries and service dates; deleting the
/// station deletes them too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub line: LineId,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>, line: LineId) -> Self {
        Self {
            id,
            name: name.into(),
            line,
        }
    }

    /// Display form qualified by the line name, e.g. `R5/Jaures`.
    pub fn qualified_name(&self, line: &Line) -> String {
        format!("{}/{}", line.name, self.name)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
