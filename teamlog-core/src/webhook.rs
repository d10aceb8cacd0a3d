//! Feedback webhook client.
//!
//! Relays new manager feedback to an external automation endpoint. One POST
//! per notification, no retries; the caller decides what to do with failures.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::WebhookConfig;

/// Body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackNotification {
    pub content: String,
    pub session_id: String,
}

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("Missing webhook URL")]
    MissingUrl,
}

#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig) -> Result<Self, WebhookError> {
        Self::with_url(config.url.clone(), Duration::from_secs(config.timeout_seconds))
    }

    /// Create a client for an explicit endpoint (for testing / integration)
    pub fn with_url(url: String, timeout: Duration) -> Result<Self, WebhookError> {
        if url.trim().is_empty() {
            return Err(WebhookError::MissingUrl);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn notify(&self, notification: &FeedbackNotification) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(notification).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WebhookError::Status {
                code: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
