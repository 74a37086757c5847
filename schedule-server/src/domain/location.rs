//! Saved groups of stations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::ids::{LocationId, StationId, UserId};

/// A user's named set of stations, queried together.
///
/// Members are plain references: deleting a location leaves its stations
/// alone. Members iterate in ascending id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub user: UserId,
    pub name: String,
    pub stations: BTreeSet<StationId>,
}

impl Location {
    pub fn new(
        id: LocationId,
        user: UserId,
        name: impl Into<String>,
        stations: impl IntoIterator<Item = StationId>,
    ) -> Self {
        Self {
            id,
            user,
            name: name.into(),
            stations: stations.into_iter().collect(),
        }
    }

    pub fn contains(&self, station: StationId) -> bool {
        self.stations.contains(&station)
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
