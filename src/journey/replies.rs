//! Plain-text replies that have no card layout

pub fn welcome() -> String {
    "Welcome to TwiliTransit! 🚌 Text 'PLAN MY TRIP to Signal City Market' to get started with your journey."
        .to_string()
}

pub fn reminder_confirmation(name: &str) -> String {
    format!(
        "Perfect, {name}! We'll send you a notification 5 minutes before your bus arrives. Have a great trip! 🚌"
    )
}

pub fn no_reminder(name: &str) -> String {
    format!(
        "No problem, {name}! Your bus (#12) departs from Main St. Bus Stop at Bay 18. \
         Text ARRIVED when you board, or REROUTE if plans change. Safe travels! 🚌"
    )
}

pub fn bus_boarded(name: &str) -> String {
    format!(
        "Great! Enjoy the bus ride, {name}. We'll notify you about the ferry transfer soon. 🚌"
    )
}

pub fn metro_directions(name: &str) -> String {
    format!(
        "🚇 {name}, Platform 2 is just ahead! Follow signs for Signal City Line. \
         Your train arrives in 8 minutes. Final stop: Signal City Market."
    )
}

pub fn rideshare_quote(name: &str) -> String {
    format!(
        "🚗 {name}, I can help you book a rideshare! Estimated time to Signal City Market: 15 minutes, \
         cost: $12-18. Reply BOOK to continue or METRO to stick with the train."
    )
}

pub fn rideshare_booked() -> String {
    "🚗 Great choice! Your rideshare is booked. Driver: Maria (Blue Honda Civic, License: ABC123) \
     will arrive in 3 minutes at the main station exit. Trip to Signal City Market: ~15 minutes."
        .to_string()
}

pub fn reroute() -> String {
    "No problem! 🔄 TwiliTransit is here to help. \
     Reply with your new destination or text SUPPORT to chat with our team."
        .to_string()
}

pub fn journey_ack() -> String {
    "Thanks for the update! We'll keep you posted on your journey. 🚀".to_string()
}

pub fn feedback_prompt(name: &str) -> String {
    format!(
        "Thank you for your feedback, {name}! 📝 \
         Rate your TwiliTransit experience (1-5): Reply with a number, or visit our feedback portal."
    )
}

pub fn next_trip(name: &str) -> String {
    format!(
        "Ready for another adventure, {name}? 🚀 Text 'PLAN MY TRIP to [destination]' to get started!"
    )
}

pub fn rating_thanks(rating: u8, name: &str) -> String {
    format!(
        "Thanks for rating us {rating}/5, {name}! ⭐ Your feedback helps us improve. Safe travels!"
    )
}

pub fn post_journey_thanks(name: &str) -> String {
    format!("Thanks for riding TwiliTransit, {name}! Reply NEXT for another trip or SUPPORT for help.")
}

pub fn support() -> String {
    "🎧 TwiliTransit Support is here to help! \
     For immediate assistance, call (555) 123-TRANSIT or continue texting for help."
        .to_string()
}

pub fn fallback() -> String {
    "Sorry, I didn't understand that. Text 'PLAN MY TRIP' to get started, \
     'REROUTE' to change plans, or 'SUPPORT' for help."
        .to_string()
}
