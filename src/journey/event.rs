//! Events that drive the journey

use super::{Intent, Scene};
use chrono::{DateTime, Utc};
use std::fmt;

/// Delayed notices standing in for "a few minutes later"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    BusArrival,
    FerryTransfer,
    MetroConnection,
    JourneyComplete,
}

impl Notice {
    pub fn scene(self) -> Scene {
        Scene::from(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Notice::BusArrival => "bus_arrival",
            Notice::FerryTransfer => "ferry_transfer",
            Notice::MetroConnection => "metro_connection",
            Notice::JourneyComplete => "journey_complete",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that trigger transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A message from the traveller, already parsed
    Inbound { intent: Intent },

    /// A scheduled notice came due. `name` is the name captured when the
    /// notice was scheduled.
    NoticeDue {
        notice: Notice,
        name: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn inbound(text: &str) -> Self {
        Event::Inbound {
            intent: Intent::parse(text),
        }
    }
}
