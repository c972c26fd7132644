//! Inbound text normalized into an intent

/// What the traveller asked for.
///
/// Quick-reply buttons send their payload (`REMIND_YES`, `ARRIVED_BUS`, ...);
/// typed replies use the short keyword (`YES`, `ARRIVED`, ...). Both map to
/// the same intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    PlanTrip,
    RemindYes,
    RemindNo,
    ArrivedBus,
    AtFerry,
    MetroInfo,
    Rideshare,
    Book,
    Reroute,
    Feedback,
    NextTrip,
    Rating(u8),
    Support,
    /// Anything else, normalized
    Other(String),
}

impl Intent {
    /// Trim, upper-case and classify. Exact keywords win over the
    /// "contains PLAN and TRIP" rule.
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_uppercase();

        let keyword = match text.as_str() {
            "REMIND_YES" | "YES" => Some(Intent::RemindYes),
            "REMIND_NO" | "NO" => Some(Intent::RemindNo),
            "ARRIVED_BUS" | "ARRIVED" => Some(Intent::ArrivedBus),
            "AT_FERRY" | "FERRY" => Some(Intent::AtFerry),
            "METRO_INFO" | "METRO" => Some(Intent::MetroInfo),
            "RIDESHARE" => Some(Intent::Rideshare),
            "BOOK" => Some(Intent::Book),
            "REROUTE" | "CHANGED_PLANS" => Some(Intent::Reroute),
            "FEEDBACK" => Some(Intent::Feedback),
            "NEXT_TRIP" | "NEXT" => Some(Intent::NextTrip),
            "SUPPORT" => Some(Intent::Support),
            _ => None,
        };
        if let Some(intent) = keyword {
            return intent;
        }

        if let Some(rating) = parse_rating(&text) {
            return Intent::Rating(rating);
        }

        if text.contains("PLAN") && text.contains("TRIP") {
            Intent::PlanTrip
        } else {
            Intent::Other(text)
        }
    }
}

/// A single digit 1-5
fn parse_rating(text: &str) -> Option<u8> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ '1'..='5'), None) => c.to_digit(10).and_then(|d| u8::try_from(d).ok()),
        _ => None,
    }
}
