//! Pure state transition function

use super::{replies, Effect, Event, Intent, JourneyContext, Notice, Scene, Session, Step};
use chrono::{DateTime, Utc};

/// Result of a state transition
#[derive(Debug, Clone)]
pub struct TransitionResult {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Number of `ScheduleNotice` effects for `notice`
    #[cfg(test)]
    pub fn scheduled(&self, notice: Notice) -> usize {
        self.effects
            .iter()
            .filter(|e| matches!(e, Effect::ScheduleNotice { notice: n, .. } if *n == notice))
            .count()
    }
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs. Sending and
/// scheduling are described by the returned effects.
pub fn transition(session: &Session, context: &JourneyContext, event: Event) -> TransitionResult {
    match event {
        Event::Inbound { intent } => inbound(session, context, intent),
        Event::NoticeDue { notice, name, at } => notice_due(session, notice, name, at),
    }
}

fn inbound(session: &Session, context: &JourneyContext, intent: Intent) -> TransitionResult {
    let name = session.name.as_str();

    match (session.step, intent) {
        // ============================================================
        // Trip planning
        // ============================================================
        (Step::Initial, Intent::PlanTrip) => {
            TransitionResult::new(session.at(Step::AwaitingReminderChoice))
                .with_effect(Effect::send_scene(Scene::TripPlanning, name))
        }

        (Step::Initial, _) => {
            TransitionResult::new(session.clone()).with_effect(Effect::send_text(replies::welcome()))
        }

        // ============================================================
        // Reminder choice
        // ============================================================
        (Step::AwaitingReminderChoice, Intent::RemindYes) => {
            let mut next = session.at(Step::ReminderSet);
            next.reminder_active = true;
            TransitionResult::new(next)
                .with_effect(Effect::send_text(replies::reminder_confirmation(name)))
                .with_effect(Effect::schedule(Notice::BusArrival, context, name))
        }

        (Step::AwaitingReminderChoice, Intent::RemindNo) => {
            TransitionResult::new(session.at(Step::NoReminder))
                .with_effect(Effect::send_text(replies::no_reminder(name)))
        }

        // Anything else while waiting for YES/NO is ignored
        (Step::AwaitingReminderChoice, _) => TransitionResult::new(session.clone()),

        // ============================================================
        // En route
        // ============================================================
        (step, intent) if step.is_en_route() => en_route(session, context, intent),

        // ============================================================
        // After arrival
        // ============================================================
        (Step::Completed, intent) => post_journey(session, intent),

        // ============================================================
        // Rerouting, rideshare booked
        // ============================================================
        (_, Intent::Support) => {
            TransitionResult::new(session.clone()).with_effect(Effect::send_text(replies::support()))
        }

        (_, _) => {
            TransitionResult::new(session.clone()).with_effect(Effect::send_text(replies::fallback()))
        }
    }
}

fn en_route(session: &Session, context: &JourneyContext, intent: Intent) -> TransitionResult {
    let name = session.name.as_str();

    match intent {
        Intent::ArrivedBus => TransitionResult::new(session.at(Step::OnBus))
            .with_effect(Effect::send_text(replies::bus_boarded(name)))
            .with_effect(Effect::schedule(Notice::FerryTransfer, context, name)),

        Intent::AtFerry => TransitionResult::new(session.at(Step::OnFerry))
            .with_effect(Effect::send_scene(Scene::FerryWelcome, name))
            .with_effect(Effect::schedule(Notice::MetroConnection, context, name)),

        Intent::MetroInfo => TransitionResult::new(session.at(Step::AtMetro))
            .with_effect(Effect::send_text(replies::metro_directions(name)))
            .with_effect(Effect::schedule(Notice::JourneyComplete, context, name)),

        Intent::Rideshare => TransitionResult::new(session.clone())
            .with_effect(Effect::send_text(replies::rideshare_quote(name))),

        Intent::Book => TransitionResult::new(session.at(Step::RideshareBooked))
            .with_effect(Effect::send_text(replies::rideshare_booked()))
            .with_effect(Effect::schedule(Notice::JourneyComplete, context, name)),

        Intent::Reroute => TransitionResult::new(session.at(Step::Rerouting))
            .with_effect(Effect::send_text(replies::reroute())),

        _ => TransitionResult::new(session.clone())
            .with_effect(Effect::send_text(replies::journey_ack())),
    }
}

fn post_journey(session: &Session, intent: Intent) -> TransitionResult {
    let name = session.name.as_str();

    match intent {
        Intent::Feedback => TransitionResult::new(session.clone())
            .with_effect(Effect::send_text(replies::feedback_prompt(name))),

        // A new journey must not receive notices left over from the last one
        Intent::NextTrip => TransitionResult::new(session.at(Step::Initial))
            .with_effect(Effect::send_text(replies::next_trip(name)))
            .with_effect(Effect::CancelNotices),

        Intent::Rating(rating) => TransitionResult::new(session.clone())
            .with_effect(Effect::send_text(replies::rating_thanks(rating, name))),

        _ => TransitionResult::new(session.clone())
            .with_effect(Effect::send_text(replies::post_journey_thanks(name))),
    }
}

fn notice_due(session: &Session, notice: Notice, name: String, at: DateTime<Utc>) -> TransitionResult {
    let send = Effect::SendScene {
        scene: notice.scene(),
        name,
    };

    match notice {
        // Completion wins over whatever step the session reached meanwhile
        Notice::JourneyComplete => {
            let mut next = session.at(Step::Completed);
            next.completed_at = Some(at);
            TransitionResult::new(next).with_effect(send)
        }
        Notice::BusArrival | Notice::FerryTransfer | Notice::MetroConnection => {
            TransitionResult::new(session.clone()).with_effect(send)
        }
    }
}
