//! Twilio REST client
//!
//! Messages go through the Messages API from a Messaging Service; rich
//! templates are created through the Content API.

use super::{ContentTemplate, ContentVariables, MessageReceipt, MessagingError, MessagingService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const MESSAGES_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const CONTENT_API_URL: &str = "https://content.twilio.com/v1/Content";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and sender for the Twilio account
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub messaging_service_sid: Option<String>,
}

/// Twilio service implementation
pub struct TwilioClient {
    client: Client,
    config: TwilioConfig,
    messages_base: String,
    content_url: String,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> Result<Self, MessagingError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MessagingError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            messages_base: MESSAGES_API_BASE.to_string(),
            content_url: CONTENT_API_URL.to_string(),
        })
    }

    fn credentials(&self) -> Result<(&str, &str), MessagingError> {
        match (&self.config.account_sid, &self.config.auth_token) {
            (Some(sid), Some(token)) => Ok((sid, token)),
            _ => Err(MessagingError::not_configured(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN are required",
            )),
        }
    }

    fn sender(&self) -> Result<&str, MessagingError> {
        self.config
            .messaging_service_sid
            .as_deref()
            .ok_or_else(|| MessagingError::not_configured("MESSAGING_SERVICE_SID is required"))
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!("{}/Accounts/{account_sid}/Messages.json", self.messages_base)
    }

    async fn create_message(&self, form: &[(&str, &str)]) -> Result<MessageReceipt, MessagingError> {
        let (account_sid, auth_token) = self.credentials()?;

        let response = self
            .client
            .post(self.messages_url(account_sid))
            .basic_auth(account_sid, Some(auth_token))
            .form(form)
            .send()
            .await
            .map_err(request_error)?;

        let resource: MessageResource = read_json(response).await?;
        Ok(MessageReceipt {
            sid: resource.sid,
            status: resource.status,
        })
    }
}

#[async_trait]
impl MessagingService for TwilioClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageReceipt, MessagingError> {
        let sender = self.sender()?;
        self.create_message(&[("To", to), ("MessagingServiceSid", sender), ("Body", body)])
            .await
    }

    async fn send_content(
        &self,
        to: &str,
        content_sid: &str,
        variables: &ContentVariables,
    ) -> Result<MessageReceipt, MessagingError> {
        let sender = self.sender()?;
        let variables = serde_json::to_string(variables).map_err(|e| {
            MessagingError::invalid_request(format!("Failed to encode content variables: {e}"))
        })?;
        self.create_message(&[
            ("To", to),
            ("MessagingServiceSid", sender),
            ("ContentSid", content_sid),
            ("ContentVariables", &variables),
        ])
        .await
    }

    async fn create_content(&self, template: &ContentTemplate) -> Result<String, MessagingError> {
        let (account_sid, auth_token) = self.credentials()?;

        let response = self
            .client
            .post(&self.content_url)
            .basic_auth(account_sid, Some(auth_token))
            .json(template)
            .send()
            .await
            .map_err(request_error)?;

        let resource: ContentResource = read_json(response).await?;
        Ok(resource.sid)
    }
}

fn request_error(e: reqwest::Error) -> MessagingError {
    if e.is_timeout() {
        MessagingError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        MessagingError::network(format!("Connection failed: {e}"))
    } else {
        MessagingError::unknown(format!("Request failed: {e}"))
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, MessagingError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| MessagingError::network(format!("Failed to read response: {e}")))?;

    if !status.is_success() {
        return Err(classify_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        MessagingError::unknown(format!("Failed to parse response: {e} - body: {body}"))
    })
}

/// Map an error response to a classified error, preferring the provider's
/// own message and code when the body carries them
fn classify_error(status: StatusCode, body: &str) -> MessagingError {
    let message = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            message: Some(message),
            code: Some(code),
        }) => format!("{message} (code {code})"),
        Ok(ApiErrorBody {
            message: Some(message),
            code: None,
        }) => message,
        _ => body.to_string(),
    };

    match status.as_u16() {
        401 | 403 => MessagingError::auth(format!("Authentication failed: {message}")),
        429 => MessagingError::rate_limit(format!("Rate limited: {message}")),
        400 | 404 => MessagingError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => MessagingError::server_error(format!("Server error: {message}")),
        _ => MessagingError::unknown(format!("HTTP {status}: {message}")),
    }
}

// Twilio API types

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResource {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<u64>,
}
