//! Settings read from the environment

use crate::journey::NoticeDelays;
use crate::messaging::TwilioConfig;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CUSTOMER_NAME: &str = "Alex";

/// How long delayed notices wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timing {
    #[default]
    Demo,
    Production,
}

impl Timing {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "demo" => Some(Timing::Demo),
            "production" | "prod" => Some(Timing::Production),
            _ => None,
        }
    }

    pub fn delays(self) -> NoticeDelays {
        match self {
            Timing::Demo => NoticeDelays::demo(),
            Timing::Production => NoticeDelays::production(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timing::Demo => "demo",
            Timing::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitConfig {
    pub twilio: TwilioConfig,
    pub phone_number_sid: Option<String>,
    pub webhook_url: Option<String>,
    pub port: u16,
    pub customer_name: String,
    pub timing: Timing,
}

impl Default for TransitConfig {
    fn default() -> Self {
        Self {
            twilio: TwilioConfig::default(),
            phone_number_sid: None,
            webhook_url: None,
            port: DEFAULT_PORT,
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
            timing: Timing::Demo,
        }
    }
}

impl TransitConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset; unparseable
    /// values fall back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = get("PORT").map_or(DEFAULT_PORT, |p| {
            p.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %p, default = DEFAULT_PORT, "Invalid PORT, using default");
                DEFAULT_PORT
            })
        });

        let timing = get("TRANSIT_TIMING").map_or(Timing::Demo, |t| {
            Timing::parse(&t).unwrap_or_else(|| {
                tracing::warn!(value = %t, "Unknown TRANSIT_TIMING, using demo");
                Timing::Demo
            })
        });

        Self {
            twilio: TwilioConfig {
                account_sid: get("TWILIO_ACCOUNT_SID"),
                auth_token: get("TWILIO_AUTH_TOKEN"),
                messaging_service_sid: get("MESSAGING_SERVICE_SID"),
            },
            phone_number_sid: get("TWILIO_PHONE_NUMBER_SID"),
            webhook_url: get("WEBHOOK_URL"),
            port,
            customer_name: get("TRANSIT_CUSTOMER_NAME")
                .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
            timing,
        }
    }

    /// Names of settings the service needs but does not have
    pub fn missing_settings(&self) -> Vec<&'static str> {
        [
            ("TWILIO_ACCOUNT_SID", self.twilio.account_sid.is_none()),
            ("TWILIO_AUTH_TOKEN", self.twilio.auth_token.is_none()),
            ("MESSAGING_SERVICE_SID", self.twilio.messaging_service_sid.is_none()),
            ("TWILIO_PHONE_NUMBER_SID", self.phone_number_sid.is_none()),
            ("WEBHOOK_URL", self.webhook_url.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}
