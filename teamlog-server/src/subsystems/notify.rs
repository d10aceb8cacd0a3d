//! Notification dispatcher — relays manager feedback to the webhook.
//!
//! Each notification runs in its own tokio task, spawned after the feedback
//! write has committed. Outcomes are only logged; nothing flows back to the
//! request that triggered it.

use std::sync::Arc;

use teamlog_core::config::WebhookConfig;
use teamlog_core::{FeedbackNotification, WebhookClient};
use tokio::task::JoinHandle;

/// Build the webhook client, or `None` when notifications are disabled or
/// the client cannot be constructed.
pub fn notifier_from_config(config: &WebhookConfig) -> Option<Arc<WebhookClient>> {
    if !config.enabled {
        tracing::info!("Feedback webhook disabled");
        return None;
    }

    match WebhookClient::new(config) {
        Ok(client) => {
            tracing::info!(url = %client.url(), "Feedback webhook enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Feedback webhook skipped: failed to create client");
            None
        }
    }
}

/// Spawn the webhook call. The handle may be dropped; the task keeps running.
pub fn spawn_feedback_notification(
    client: Arc<WebhookClient>,
    notification: FeedbackNotification,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match client.notify(&notification).await {
            Ok(()) => tracing::info!(
                session_id = %notification.session_id,
                "Feedback notification delivered"
            ),
            Err(e) => tracing::error!(
                session_id = %notification.session_id,
                error = %e,
                "Feedback notification failed"
            ),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notification() -> FeedbackNotification {
        FeedbackNotification {
            content: "Great job".to_string(),
            session_id: "s1".to_string(),
        }
    }

    #[test]
    fn test_disabled_config_yields_no_notifier() {
        let config = WebhookConfig {
            enabled: false,
            url: "http://localhost:5678/webhook".to_string(),
            timeout_seconds: 1,
        };
        assert!(notifier_from_config(&config).is_none());
    }

    #[test]
    fn test_enabled_without_url_yields_no_notifier() {
        let config = WebhookConfig {
            enabled: true,
            url: String::new(),
            timeout_seconds: 1,
        };
        assert!(notifier_from_config(&config).is_none());
    }

    #[tokio::test]
    async fn test_spawned_notification_reaches_endpoint() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"content": "Great job", "sessionId": "s1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Arc::new(WebhookClient::with_url(mock_server.uri(), Duration::from_secs(5)).unwrap());
        spawn_feedback_notification(client, notification()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_notification_does_not_panic_task() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = Arc::new(WebhookClient::with_url(mock_server.uri(), Duration::from_secs(5)).unwrap());
        let joined = spawn_feedback_notification(client, notification()).await;
        assert!(joined.is_ok(), "Task should complete normally on webhook failure");
    }
}
