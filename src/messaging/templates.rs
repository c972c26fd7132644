//! Content templates for each journey scene
//!
//! A scene is delivered as a rich card when its template has been created
//! with the provider, and as plain text otherwise. Every scene therefore has
//! three renderings: the card definition, the plain-text fallback used when
//! no template exists, and a shorter degraded text used when the templated
//! send fails.

use super::ContentVariables;
use crate::journey::Scene;
use serde::Serialize;
use std::collections::BTreeMap;

const SAMPLE_NAME: &str = "Alex";
const BUS_NUMBER: &str = "12";
const BUS_BAY: &str = "Bay 18";

/// Request body for the provider's Content API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTemplate {
    pub friendly_name: String,
    pub language: String,
    /// Sample values for each placeholder
    pub variables: ContentVariables,
    pub types: ContentTypes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTypes {
    #[serde(rename = "twilio/card")]
    pub card: Card,
    #[serde(rename = "twilio/text")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
    pub actions: Vec<CardAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CardAction {
    /// Tapping sends `payload` back as an inbound message
    #[serde(rename = "QUICK_REPLY")]
    Reply {
        title: String,
        #[serde(rename = "id")]
        payload: String,
    },
    #[serde(rename = "URL")]
    Url { title: String, url: String },
}

impl CardAction {
    fn reply(title: &str, payload: &str) -> Self {
        CardAction::Reply {
            title: title.to_string(),
            payload: payload.to_string(),
        }
    }

    fn url(title: &str, url: &str) -> Self {
        CardAction::Url {
            title: title.to_string(),
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBody {
    pub body: String,
}

/// Values substituted into the scene's placeholders
pub fn variables(scene: Scene, name: &str) -> ContentVariables {
    let mut vars = BTreeMap::from([("1".to_string(), name.to_string())]);
    if scene == Scene::BusReminder {
        vars.insert("2".to_string(), BUS_NUMBER.to_string());
        vars.insert("3".to_string(), BUS_BAY.to_string());
    }
    vars
}

/// Plain text sent when the scene has no registered template
pub fn fallback_text(scene: Scene, name: &str) -> String {
    match scene {
        Scene::TripPlanning => format!(
            "Hi {name}! Welcome to TwiliTransit. Let's help you get to Signal City Market. \
             Reply YES for bus reminders or NO to skip."
        ),
        Scene::BusReminder => format!(
            "{name}, your bus (#{BUS_NUMBER}) arrives in 5 minutes at {BUS_BAY}. \
             Reply 'Yes, I'm here' when you arrive or 'No, I changed my plans' if needed."
        ),
        Scene::FerryTransfer => format!(
            "{name}, you're almost at the ferry terminal! Transfer window: 8 minutes. \
             Reply FERRY when you arrive."
        ),
        Scene::FerryWelcome => format!(
            "Welcome aboard the ferry, {name}! 🛥️ Enjoy the scenic view. \
             In about 12 minutes, we'll guide you to the Signal City Metro for the final leg of your journey."
        ),
        Scene::MetroConnection => format!(
            "{name}, you're arriving at Riverside Station! Your train departs in 12 minutes \
             from Platform 2. Reply METRO for info."
        ),
        Scene::JourneyComplete => format!(
            "🎉 You've arrived at Signal City Market, {name}! Your TwiliTransit journey is complete. \
             Reply FEEDBACK to share your experience."
        ),
    }
}

/// Shorter text sent when the templated send failed
pub fn degraded_text(scene: Scene, name: &str) -> String {
    match scene {
        Scene::TripPlanning => format!(
            "Hi {name}! Welcome to TwiliTransit. Reply YES for bus reminders or NO to skip."
        ),
        Scene::BusReminder => format!(
            "{name}, your bus (#{BUS_NUMBER}) arrives in 5 minutes at {BUS_BAY}. Reply when you arrive."
        ),
        Scene::FerryTransfer => format!(
            "{name}, you're almost at the ferry terminal! Reply FERRY when you arrive."
        ),
        Scene::FerryWelcome => format!(
            "Welcome aboard the ferry, {name}! 🛥️ Enjoy the view. \
             In about 12 minutes, we'll guide you to the Signal City Metro for the final leg of your journey."
        ),
        Scene::MetroConnection => format!(
            "{name}, you're arriving at Riverside Station! Train departs in 12 minutes from Platform 2."
        ),
        Scene::JourneyComplete => {
            format!("🎉 You've arrived at Signal City Market, {name}! Journey complete.")
        }
    }
}

/// Template definition submitted during setup
pub fn template(scene: Scene) -> ContentTemplate {
    let (friendly_name, card, text) = match scene {
        Scene::TripPlanning => (
            "scene1_trip_planning",
            Card {
                title: "Hi {{1}}! 🚌 Welcome to TwiliTransit".to_string(),
                body: "Let's help you get to Signal City Market. Your journey starts at Main St. \
                       Bus Stop. Would you like a reminder 5 minutes before the bus arrives?"
                    .to_string(),
                media: vec![],
                actions: vec![
                    CardAction::reply("Yes, remind me", "REMIND_YES"),
                    CardAction::reply("No thanks", "REMIND_NO"),
                ],
            },
            "Hi {{1}}! Welcome to TwiliTransit. Let's help you get to Signal City Market. \
             Reply YES for bus reminders or NO to skip.",
        ),
        Scene::BusReminder => (
            "scene2_bus_reminder",
            Card {
                title: "🚌 Bus Alert for {{1}}".to_string(),
                body: "Your bus (#{{2}}) is arriving in 5 minutes at {{3}}. Let us know when you arrive!"
                    .to_string(),
                media: vec![],
                actions: vec![
                    CardAction::reply("Yes, I'm here", "ARRIVED_BUS"),
                    CardAction::reply("No, I changed my plans", "CHANGED_PLANS"),
                    CardAction::url(
                        "View Map & Boarding Pass",
                        "https://maps.google.com/?q=Main+St+Bus+Stop",
                    ),
                ],
            },
            "{{1}}, your bus (#{{2}}) arrives in 5 minutes at {{3}}. Reply 'Yes, I'm here' when \
             you arrive or 'No, I changed my plans' if needed.",
        ),
        Scene::FerryTransfer => (
            "scene3_ferry_transfer",
            Card {
                title: "⛴️ Ferry Transfer - {{1}}".to_string(),
                body: "You're almost at the ferry terminal! Transfer window: 8 minutes. \
                       Here's your QR code for express boarding."
                    .to_string(),
                media: vec![
                    "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=FERRY_BOARDING_PASS_12345"
                        .to_string(),
                ],
                actions: vec![
                    CardAction::url(
                        "Directions to Ferry",
                        "https://maps.google.com/?q=Ferry+Terminal+Riverside",
                    ),
                    CardAction::reply("Let us know when you've docked", "AT_FERRY"),
                ],
            },
            "{{1}}, you're almost at the ferry terminal! Transfer window: 8 minutes. \
             Reply when you've docked at Riverside Station.",
        ),
        Scene::FerryWelcome => (
            "scene4_ferry_welcome",
            Card {
                title: "🛥️ Welcome Aboard - {{1}}".to_string(),
                body: "Welcome aboard! Enjoy the view. Here are ferry amenities and your next \
                       connection info."
                    .to_string(),
                media: vec![],
                actions: vec![
                    CardAction::url(
                        "Ferry Amenities",
                        "https://twilitransit.example.com/ferry-amenities",
                    ),
                    CardAction::reply("Chat with Support", "SUPPORT"),
                    CardAction::url("Route Map", "https://maps.google.com/?q=Signal+City+Metro"),
                ],
            },
            "Welcome aboard, {{1}}! Enjoy the view. We'll guide you to the Signal City Metro \
             when you dock. Reply SUPPORT if you need help.",
        ),
        Scene::MetroConnection => (
            "scene5_metro_connection",
            Card {
                title: "🚇 Metro Connection - {{1}}".to_string(),
                body: "You're arriving at Riverside Station! Your train departs in 12 minutes \
                       from Platform 2."
                    .to_string(),
                media: vec![],
                actions: vec![
                    CardAction::reply("Show route map & real-time info", "METRO_INFO"),
                    CardAction::reply("Book rideshare instead", "RIDESHARE"),
                    CardAction::url(
                        "Platform Map",
                        "https://maps.google.com/?q=Riverside+Station+Platform+2",
                    ),
                ],
            },
            "{{1}}, you're arriving at Riverside Station! Your train departs in 12 minutes from \
             Platform 2. Reply METRO for route info or RIDESHARE for alternatives.",
        ),
        Scene::JourneyComplete => (
            "scene6_journey_complete",
            Card {
                title: "🎉 You've Arrived - {{1}}".to_string(),
                body: "You've arrived at Signal City Market! Your TwiliTransit journey is complete. \
                       Here's your trip summary and receipts."
                    .to_string(),
                media: vec![],
                actions: vec![
                    CardAction::reply("Share feedback", "FEEDBACK"),
                    CardAction::reply("Plan your next journey", "NEXT_TRIP"),
                    CardAction::url(
                        "Trip Summary & Receipts",
                        "https://twilitransit.example.com/trip-summary",
                    ),
                ],
            },
            "🎉 You've arrived at Signal City Market, {{1}}! Your TwiliTransit journey is complete. \
             Reply FEEDBACK to share your experience or NEXT to plan another journey.",
        ),
    };

    ContentTemplate {
        friendly_name: friendly_name.to_string(),
        language: "en".to_string(),
        variables: variables(scene, SAMPLE_NAME),
        types: ContentTypes {
            card,
            text: TextBody {
                body: text.to_string(),
            },
        },
    }
}
