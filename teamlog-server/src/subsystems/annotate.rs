use std::sync::Arc;

use teamlog_core::{CallLogRecord, FeedbackNotification, RecordStore, TeamLogError, WebhookClient};
use tokio::task::JoinHandle;

use crate::subsystems::notify;
use crate::subsystems::present;

/// Result of a committed annotation.
#[derive(Debug)]
pub struct Annotation {
    pub record: CallLogRecord,
    /// Webhook task, when a notifier is configured. Callers on the request
    /// path drop it; tests may await it.
    pub notification: Option<JoinHandle<()>>,
}

/// Attach manager feedback to the call log for `(member_id, session_id)`.
///
/// The write is committed before the webhook task is spawned, so the outcome
/// of the notification cannot affect the result returned here.
pub async fn annotate_call_log(
    store: &dyn RecordStore,
    notifier: Option<&Arc<WebhookClient>>,
    member_id: Option<&str>,
    session_id: Option<&str>,
    manager_feedback: Option<&str>,
) -> Result<Annotation, TeamLogError> {
    let (member_id, session_id) = match (present(member_id), present(session_id)) {
        (Some(m), Some(s)) => (m, s),
        _ => {
            return Err(TeamLogError::MissingParameter(
                "Member ID and Session ID required".to_string(),
            ))
        }
    };

    let manager_feedback = present(manager_feedback)
        .ok_or_else(|| TeamLogError::MissingParameter("Manager feedback required".to_string()))?;

    let record = store
        .update_feedback(member_id, session_id, manager_feedback)
        .await?
        .ok_or_else(|| TeamLogError::NotFound {
            member_id: member_id.to_string(),
            session_id: session_id.to_string(),
        })?;

    tracing::info!(
        member_id = %member_id,
        session_id = %session_id,
        "Manager feedback saved"
    );

    let notification = notifier.map(|client| {
        notify::spawn_feedback_notification(
            Arc::clone(client),
            FeedbackNotification {
                content: manager_feedback.to_string(),
                session_id: session_id.to_string(),
            },
        )
    });

    Ok(Annotation {
        record,
        notification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystems::ingest::create_call_log;
    use std::time::Duration;
    use teamlog_core::MemoryRecordStore;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn seeded_store() -> MemoryRecordStore {
        let store = MemoryRecordStore::new();
        let submission = serde_json::from_value(serde_json::json!({
            "session_id": "s1",
            "member_id": "m1",
            "team_id": "t1",
            "date": "2024-01-01",
            "user_name": "Alice",
            "agent_name": "Bot",
            "overall_score": 85
        }))
        .unwrap();
        create_call_log(&store, submission).await.unwrap();
        store
    }

    fn notifier_for(server: &MockServer) -> Arc<WebhookClient> {
        Arc::new(WebhookClient::with_url(server.uri(), Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_missing_identifiers() {
        let store = seeded_store().await;
        for (member, session) in [(None, Some("s1")), (Some("m1"), None), (Some(" "), Some("s1"))] {
            let err = annotate_call_log(&store, None, member, session, Some("Great job"))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Member ID and Session ID required");
        }
    }

    #[tokio::test]
    async fn test_missing_feedback() {
        let store = seeded_store().await;
        for feedback in [None, Some(""), Some("   ")] {
            let err = annotate_call_log(&store, None, Some("m1"), Some("s1"), feedback)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Manager feedback required");
        }
    }

    #[tokio::test]
    async fn test_unknown_pair_is_not_found_and_skips_webhook() {
        let store = seeded_store().await;
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        let notifier = notifier_for(&mock_server);

        let err = annotate_call_log(&store, Some(&notifier), Some("m1"), Some("s404"), Some("F"))
            .await
            .unwrap_err();
        assert!(matches!(err, TeamLogError::NotFound { .. }));

        let rows = store.list_by_team("t1").await.unwrap();
        assert_eq!(rows[0].manager_feedback, None);
    }

    #[tokio::test]
    async fn test_second_annotation_wins_with_later_timestamp() {
        let store = seeded_store().await;

        let first = annotate_call_log(&store, None, Some("m1"), Some("s1"), Some("F1"))
            .await
            .unwrap();
        let second = annotate_call_log(&store, None, Some("m1"), Some("s1"), Some("F2"))
            .await
            .unwrap();

        assert!(first.notification.is_none());
        assert_eq!(second.record.manager_feedback.as_deref(), Some("F2"));
        assert!(second.record.updated_at > first.record.updated_at);
    }

    #[tokio::test]
    async fn test_success_dispatches_notification() {
        let store = seeded_store().await;
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({"content": "Great job", "sessionId": "s1"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;
        let notifier = notifier_for(&mock_server);

        let annotation =
            annotate_call_log(&store, Some(&notifier), Some("m1"), Some("s1"), Some("Great job"))
                .await
                .unwrap();

        assert_eq!(annotation.record.manager_feedback.as_deref(), Some("Great job"));
        annotation
            .notification
            .expect("notification task should be spawned")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_webhook_failure_keeps_annotation_committed() {
        let store = seeded_store().await;
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let notifier = notifier_for(&mock_server);

        let annotation =
            annotate_call_log(&store, Some(&notifier), Some("m1"), Some("s1"), Some("Great job"))
                .await
                .unwrap();
        annotation.notification.unwrap().await.unwrap();

        let rows = store.list_by_team("t1").await.unwrap();
        assert_eq!(rows[0].manager_feedback.as_deref(), Some("Great job"));
    }
}
