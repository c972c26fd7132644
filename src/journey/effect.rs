//! Effects produced by transitions

use super::{JourneyContext, Notice, Scene};
use std::time::Duration;

/// Effects to be executed after a transition, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Deliver a scene, templated when a template is registered
    SendScene { scene: Scene, name: String },

    /// Deliver plain text
    SendText { body: String },

    /// Fire `notice` after `delay`
    ScheduleNotice {
        notice: Notice,
        delay: Duration,
        name: String,
    },

    /// Drop every notice still pending for this user
    CancelNotices,
}

impl Effect {
    pub fn send_scene(scene: Scene, name: &str) -> Self {
        Effect::SendScene {
            scene,
            name: name.to_string(),
        }
    }

    pub fn send_text(body: impl Into<String>) -> Self {
        Effect::SendText { body: body.into() }
    }

    pub fn schedule(notice: Notice, context: &JourneyContext, name: &str) -> Self {
        Effect::ScheduleNotice {
            notice,
            delay: context.delays.for_notice(notice),
            name: name.to_string(),
        }
    }

    #[cfg(test)]
    pub fn is_send(&self) -> bool {
        matches!(self, Effect::SendScene { .. } | Effect::SendText { .. })
    }
}
