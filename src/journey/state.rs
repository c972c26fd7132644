//! Session and step types

use super::Notice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stage of a traveller's journey
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Initial,
    AwaitingReminderChoice,
    ReminderSet,
    NoReminder,
    OnBus,
    OnFerry,
    AtMetro,
    RideshareBooked,
    Rerouting,
    Completed,
}

impl Step {
    #[cfg(test)]
    pub const ALL: [Step; 10] = [
        Step::Initial,
        Step::AwaitingReminderChoice,
        Step::ReminderSet,
        Step::NoReminder,
        Step::OnBus,
        Step::OnFerry,
        Step::AtMetro,
        Step::RideshareBooked,
        Step::Rerouting,
        Step::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Step::Initial => "initial",
            Step::AwaitingReminderChoice => "awaiting_reminder_choice",
            Step::ReminderSet => "reminder_set",
            Step::NoReminder => "no_reminder",
            Step::OnBus => "on_bus",
            Step::OnFerry => "on_ferry",
            Step::AtMetro => "at_metro",
            Step::RideshareBooked => "rideshare_booked",
            Step::Rerouting => "rerouting",
            Step::Completed => "completed",
        }
    }

    /// Steps where the traveller is somewhere along the route and journey
    /// updates (arrived, ferry, metro, rideshare, reroute) are accepted.
    pub fn is_en_route(self) -> bool {
        matches!(
            self,
            Step::ReminderSet | Step::NoReminder | Step::OnBus | Step::OnFerry | Step::AtMetro
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user conversation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub step: Step,
    pub name: String,
    pub reminder_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            step: Step::Initial,
            name: name.into(),
            reminder_active: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Same session, moved to `step`
    pub fn at(&self, step: Step) -> Self {
        Self {
            step,
            ..self.clone()
        }
    }
}

/// How long each delayed notice waits before firing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeDelays {
    pub bus_arrival: Duration,
    pub ferry_transfer: Duration,
    pub metro_connection: Duration,
    pub journey_complete: Duration,
}

impl NoticeDelays {
    /// Short waits so a live demo moves along
    pub fn demo() -> Self {
        Self {
            bus_arrival: Duration::from_secs(5),
            ferry_transfer: Duration::from_secs(10),
            metro_connection: Duration::from_secs(15),
            journey_complete: Duration::from_secs(10),
        }
    }

    /// Waits that roughly match a real trip
    pub fn production() -> Self {
        Self {
            bus_arrival: Duration::from_secs(5 * 60),
            ferry_transfer: Duration::from_secs(10 * 60),
            metro_connection: Duration::from_secs(15 * 60),
            journey_complete: Duration::from_secs(10 * 60),
        }
    }

    /// Every notice waits `delay`
    #[cfg(test)]
    pub fn uniform(delay: Duration) -> Self {
        Self {
            bus_arrival: delay,
            ferry_transfer: delay,
            metro_connection: delay,
            journey_complete: delay,
        }
    }

    pub fn for_notice(&self, notice: Notice) -> Duration {
        match notice {
            Notice::BusArrival => self.bus_arrival,
            Notice::FerryTransfer => self.ferry_transfer,
            Notice::MetroConnection => self.metro_connection,
            Notice::JourneyComplete => self.journey_complete,
        }
    }
}

impl Default for NoticeDelays {
    fn default() -> Self {
        Self::demo()
    }
}

/// Settings shared by every transition
#[derive(Debug, Clone, Default)]
pub struct JourneyContext {
    pub delays: NoticeDelays,
}

impl JourneyContext {
    pub fn new(delays: NoticeDelays) -> Self {
        Self { delays }
    }
}
