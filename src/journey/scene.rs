//! Journey scenes that have a rich content template

use super::Notice;
use std::fmt;

/// A point in the journey with its own card layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scene {
    TripPlanning,
    BusReminder,
    FerryTransfer,
    FerryWelcome,
    MetroConnection,
    JourneyComplete,
}

impl Scene {
    pub const ALL: [Scene; 6] = [
        Scene::TripPlanning,
        Scene::BusReminder,
        Scene::FerryTransfer,
        Scene::FerryWelcome,
        Scene::MetroConnection,
        Scene::JourneyComplete,
    ];

    /// Key used in JSON responses
    pub fn key(self) -> &'static str {
        match self {
            Scene::TripPlanning => "tripPlanning",
            Scene::BusReminder => "busReminder",
            Scene::FerryTransfer => "ferryTransfer",
            Scene::FerryWelcome => "ferryWelcome",
            Scene::MetroConnection => "metroConnection",
            Scene::JourneyComplete => "journeyComplete",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl From<Notice> for Scene {
    fn from(notice: Notice) -> Self {
        match notice {
            Notice::BusArrival => Scene::BusReminder,
            Notice::FerryTransfer => Scene::FerryTransfer,
            Notice::MetroConnection => Scene::MetroConnection,
            Notice::JourneyComplete => Scene::JourneyComplete,
        }
    }
}
