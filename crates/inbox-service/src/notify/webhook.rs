//! Webhook notification dispatcher

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use inbox_core::entities::NewMessageNotification;
use inbox_core::error::DomainError;
use inbox_core::traits::NotificationDispatcher;

/// Posts notifications as JSON to an HTTP endpoint (mail relay, push bridge, ...)
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::InternalError(format!("webhook client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookNotifier {
    #[instrument(skip(self, notification), fields(conversation_id = %notification.conversation_id))]
    async fn dispatch(&self, notification: NewMessageNotification) -> Result<(), DomainError> {
        let response = self
            .client
            .post(&self.url)
            .json(&notification)
            .send()
            .await
            .map_err(|e| DomainError::InternalError(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::InternalError(format!(
                "webhook responded with {status}"
            )));
        }

        debug!(%status, "Notification delivered");
        Ok(())
    }
}
