//! Outbound reply dispatch with graceful degradation

use super::templates;
use super::{MessageReceipt, MessagingError, MessagingService, TemplateRegistry};
use crate::journey::Scene;
use std::sync::Arc;

/// How a send ended. Never an error: a failed send must not block the
/// conversation, but callers can still see what happened.
#[derive(Debug)]
pub enum SendOutcome {
    /// Rich template delivered
    Templated(MessageReceipt),
    /// Plain text delivered
    PlainText(MessageReceipt),
    /// Templated send failed; the degraded text was tried instead
    Degraded {
        cause: MessagingError,
        receipt: Option<MessageReceipt>,
    },
    /// Nothing was delivered
    Failed(MessagingError),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        match self {
            SendOutcome::Templated(_) | SendOutcome::PlainText(_) => true,
            SendOutcome::Degraded { receipt, .. } => receipt.is_some(),
            SendOutcome::Failed(_) => false,
        }
    }
}

/// Sends scenes and plain text to a traveller
#[derive(Clone)]
pub struct Dispatcher {
    messenger: Arc<dyn MessagingService>,
    templates: Arc<TemplateRegistry>,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn MessagingService>, templates: Arc<TemplateRegistry>) -> Self {
        Self {
            messenger,
            templates,
        }
    }

    pub fn templates(&self) -> &Arc<TemplateRegistry> {
        &self.templates
    }

    /// Deliver a scene: the registered template if there is one, the plain
    /// fallback text otherwise, and the degraded text if the templated send
    /// fails.
    pub async fn send_scene(&self, to: &str, scene: Scene, name: &str) -> SendOutcome {
        let Some(content_sid) = self.templates.get(scene).await else {
            return self.send_text(to, &templates::fallback_text(scene, name)).await;
        };

        let variables = templates::variables(scene, name);
        match self.messenger.send_content(to, &content_sid, &variables).await {
            Ok(receipt) => SendOutcome::Templated(receipt),
            Err(cause) => {
                tracing::warn!(
                    to = %to,
                    scene = %scene,
                    error = %cause,
                    "Templated send failed, falling back to text"
                );
                let receipt = match self.send_text(to, &templates::degraded_text(scene, name)).await {
                    SendOutcome::PlainText(receipt) => Some(receipt),
                    _ => None,
                };
                SendOutcome::Degraded { cause, receipt }
            }
        }
    }

    /// Deliver plain text. Failures are logged and reported, never raised.
    pub async fn send_text(&self, to: &str, body: &str) -> SendOutcome {
        match self.messenger.send_text(to, body).await {
            Ok(receipt) => SendOutcome::PlainText(receipt),
            Err(e) => {
                tracing::error!(to = %to, error = %e, kind = e.kind.as_str(), "Error sending message");
                SendOutcome::Failed(e)
            }
        }
    }
}
