//! Outbound messaging
//!
//! A provider-neutral interface over the messaging API, the Twilio
//! implementation, and the dispatcher that picks between rich templates and
//! plain text.

mod dispatcher;
mod error;
mod registry;
pub mod templates;
mod twilio;

pub use dispatcher::{Dispatcher, SendOutcome};
pub use error::{MessagingError, MessagingErrorKind};
pub use registry::TemplateRegistry;
pub use templates::ContentTemplate;
pub use twilio::{TwilioClient, TwilioConfig};

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Placeholder number → value, e.g. `{"1": "Alex"}`
pub type ContentVariables = BTreeMap<String, String>;

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReceipt {
    pub sid: String,
    pub status: Option<String>,
}

/// Common interface for messaging providers
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Send a plain-text message
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageReceipt, MessagingError>;

    /// Send a registered content template with its variables filled in
    async fn send_content(
        &self,
        to: &str,
        content_sid: &str,
        variables: &ContentVariables,
    ) -> Result<MessageReceipt, MessagingError>;

    /// Create a content template, returning its id
    async fn create_content(&self, template: &ContentTemplate) -> Result<String, MessagingError>;
}

/// Logging wrapper for messaging services
pub struct LoggingMessenger {
    inner: Arc<dyn MessagingService>,
}

impl LoggingMessenger {
    pub fn new(inner: Arc<dyn MessagingService>) -> Self {
        Self { inner }
    }
}

fn log_send(
    operation: &'static str,
    to: &str,
    started: std::time::Instant,
    result: &Result<MessageReceipt, MessagingError>,
) {
    let duration = started.elapsed();
    match result {
        Ok(receipt) => {
            tracing::info!(
                operation,
                to = %to,
                sid = %receipt.sid,
                status = receipt.status.as_deref().unwrap_or("unknown"),
                duration_ms = %duration.as_millis(),
                "Message accepted"
            );
        }
        Err(e) => {
            tracing::error!(
                operation,
                to = %to,
                duration_ms = %duration.as_millis(),
                error = %e.message,
                kind = e.kind.as_str(),
                "Message send failed"
            );
        }
    }
}

#[async_trait]
impl MessagingService for LoggingMessenger {
    async fn send_text(&self, to: &str, body: &str) -> Result<MessageReceipt, MessagingError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_text(to, body).await;
        log_send("text", to, start, &result);
        result
    }

    async fn send_content(
        &self,
        to: &str,
        content_sid: &str,
        variables: &ContentVariables,
    ) -> Result<MessageReceipt, MessagingError> {
        let start = std::time::Instant::now();
        let result = self.inner.send_content(to, content_sid, variables).await;
        log_send("content", to, start, &result);
        result
    }

    async fn create_content(&self, template: &ContentTemplate) -> Result<String, MessagingError> {
        let start = std::time::Instant::now();
        let result = self.inner.create_content(template).await;
        let duration = start.elapsed();

        match &result {
            Ok(sid) => tracing::info!(
                friendly_name = %template.friendly_name,
                sid = %sid,
                duration_ms = %duration.as_millis(),
                "Content template accepted"
            ),
            Err(e) => tracing::error!(
                friendly_name = %template.friendly_name,
                duration_ms = %duration.as_millis(),
                error = %e.message,
                kind = e.kind.as_str(),
                "Content template rejected"
            ),
        }

        result
    }
}
