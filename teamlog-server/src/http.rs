//! Team call log HTTP API
//!
//! Axum-based HTTP server that exposes call log ingestion, retrieval and
//! annotation over JSON.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a pure
//! inner function returning `(StatusCode, serde_json::Value)`. The inner
//! functions are directly testable without axum dispatch machinery.
//!
//! Endpoints:
//! - OPTIONS /api/team-logs — CORS preflight
//! - POST    /api/team-logs — create a call log
//! - GET     /api/team-logs — list a team's call logs (`teamId`, `memberId`)
//! - PUT     /api/team-logs — attach manager feedback (`member_id`, `session_id`)
//! - GET     /health        — health check with store status
//! - GET     /version       — server version info

use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use teamlog_core::config::HttpConfig;
use teamlog_core::{CallLogSubmission, RecordStore, TeamLogError, WebhookClient};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::subsystems::{annotate, ingest, retrieve};

pub const TEAM_LOGS_PATH: &str = "/api/team-logs";

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Shared state for all HTTP handlers
pub struct HttpState {
    pub store: Arc<dyn RecordStore>,
    pub notifier: Option<Arc<WebhookClient>>,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route(
            TEAM_LOGS_PATH,
            get(list_handler)
                .post(create_handler)
                .put(annotate_handler)
                .options(preflight_handler),
        )
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    config: &HttpConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Team log HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request / Response DTOs
// ============================================================================

/// Raw query string pairs, in order. Repeated keys are allowed.
pub type QueryPairs = Vec<(String, String)>;

#[derive(Debug, Default)]
pub struct ListParams {
    pub team_id: Option<String>,
    pub member_id: Option<String>,
}

impl ListParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            team_id: first_value(pairs, "teamId"),
            member_id: first_value(pairs, "memberId"),
        }
    }
}

#[derive(Debug, Default)]
pub struct AnnotateParams {
    pub member_id: Option<String>,
    pub session_id: Option<String>,
}

impl AnnotateParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            member_id: first_value(pairs, "member_id"),
            session_id: first_value(pairs, "session_id"),
        }
    }
}

/// Standard HTTP error response. `details` is only set for server errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            details: None,
        }
    }

    pub fn with_details(msg: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            details: Some(details.into()),
        }
    }

    fn into_body(self, status: StatusCode) -> (StatusCode, serde_json::Value) {
        (status, serde_json::json!(self))
    }
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner create — deserializes the submission and runs ingestion.
pub async fn create_inner(
    state: &HttpState,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    if !payload.is_object() {
        return ErrorResponse::new("Invalid request body: expected a JSON object")
            .into_body(StatusCode::BAD_REQUEST);
    }

    let submission: CallLogSubmission = match serde_json::from_value(payload) {
        Ok(s) => s,
        Err(e) => {
            return ErrorResponse::new(format!("Invalid request body: {}", e))
                .into_body(StatusCode::BAD_REQUEST);
        }
    };

    match ingest::create_call_log(state.store.as_ref(), submission).await {
        Ok(record) => to_body(&record),
        Err(e) => error_response(&e, "Failed to create team log"),
    }
}

/// Inner list — validates identifiers and returns the team's records.
pub async fn list_inner(state: &HttpState, params: ListParams) -> (StatusCode, serde_json::Value) {
    let result = retrieve::list_team_logs(
        state.store.as_ref(),
        params.team_id.as_deref(),
        params.member_id.as_deref(),
    )
    .await;

    match result {
        Ok(rows) => to_body(&rows),
        Err(e) => error_response(&e, "Failed to fetch team logs"),
    }
}

/// Inner annotate — saves feedback; the webhook task is detached.
pub async fn annotate_inner(
    state: &HttpState,
    params: AnnotateParams,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let feedback = payload
        .get("manager_feedback")
        .and_then(serde_json::Value::as_str);

    let result = annotate::annotate_call_log(
        state.store.as_ref(),
        state.notifier.as_ref(),
        params.member_id.as_deref(),
        params.session_id.as_deref(),
        feedback,
    )
    .await;

    match result {
        Ok(annotation) => to_body(&annotation.record),
        Err(e) => error_response(&e, "Failed to update team log"),
    }
}

/// Inner health check — queries the store and returns (status_code, json_body).
pub async fn health_inner(store: &dyn RecordStore) -> (StatusCode, serde_json::Value) {
    match store.health().await {
        Ok(status) => (
            StatusCode::OK,
            serde_json::json!({
                "status": "healthy",
                "version": env!("CARGO_PKG_VERSION"),
                "backend": store.backend(),
                "store": status,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "status": "unhealthy",
                "backend": store.backend(),
                "error": e.to_string(),
            }),
        ),
    }
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "service": "teamlog",
    })
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn preflight_handler() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn create_handler(
    State(state): State<Arc<HttpState>>,
    body: Bytes,
) -> impl IntoResponse {
    let (status, body) = match parse_json(&body) {
        Ok(payload) => create_inner(&state, payload).await,
        Err(e) => ErrorResponse::new(e).into_body(StatusCode::BAD_REQUEST),
    };
    (status, Json(body))
}

pub async fn list_handler(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> impl IntoResponse {
    let (status, body) = match query {
        Ok(Query(pairs)) => list_inner(&state, ListParams::from_pairs(&pairs)).await,
        Err(e) => query_error(e),
    };
    (status, Json(body))
}

pub async fn annotate_handler(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<QueryPairs>, QueryRejection>,
    body: Bytes,
) -> impl IntoResponse {
    let pairs = match query {
        Ok(Query(pairs)) => pairs,
        Err(e) => {
            let (status, body) = query_error(e);
            return (status, Json(body));
        }
    };

    // An unreadable body is reported as missing feedback.
    let payload = parse_json(&body).unwrap_or(serde_json::Value::Null);
    let (status, body) = annotate_inner(&state, AnnotateParams::from_pairs(&pairs), payload).await;
    (status, Json(body))
}

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(state.store.as_ref()).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Map a service error onto an HTTP status and error body.
pub fn error_response(err: &TeamLogError, failure: &str) -> (StatusCode, serde_json::Value) {
    match err {
        TeamLogError::Validation(_) | TeamLogError::MissingParameter(_) => {
            ErrorResponse::new(err.to_string()).into_body(StatusCode::BAD_REQUEST)
        }
        TeamLogError::NotFound { .. } => {
            ErrorResponse::new("Log not found").into_body(StatusCode::NOT_FOUND)
        }
        TeamLogError::Duplicate { .. } => {
            ErrorResponse::new(err.to_string()).into_body(StatusCode::CONFLICT)
        }
        TeamLogError::Database(_) => {
            tracing::error!(error = %err, "{}", failure);
            ErrorResponse::with_details(failure, err.to_string())
                .into_body(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// First value for `key`; later repeats are ignored.
fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn query_error(rejection: QueryRejection) -> (StatusCode, serde_json::Value) {
    ErrorResponse::new(format!("Invalid query string: {}", rejection.body_text()))
        .into_body(StatusCode::BAD_REQUEST)
}

fn parse_json(body: &[u8]) -> std::result::Result<serde_json::Value, String> {
    serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {}", e))
}

fn to_body<T: Serialize>(value: &T) -> (StatusCode, serde_json::Value) {
    match serde_json::to_value(value) {
        Ok(v) => (StatusCode::OK, v),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response");
            ErrorResponse::with_details("Failed to serialize response", e.to_string())
                .into_body(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use teamlog_core::{MemoryRecordStore, ValidationError};

    fn make_state() -> HttpState {
        HttpState {
            store: Arc::new(MemoryRecordStore::new()),
            notifier: None,
        }
    }

    fn scenario_body() -> serde_json::Value {
        serde_json::json!({
            "session_id": "s1",
            "member_id": "m1",
            "team_id": "t1",
            "date": "2024-01-01",
            "user_name": "Alice",
            "agent_name": "Bot",
            "overall_score": 85,
            "engagement_score": 70
        })
    }

    #[test]
    fn test_version_inner_pure() {
        let v = version_inner();
        assert!(v["version"].is_string(), "version must be string");
        assert_eq!(v["service"], "teamlog");
    }

    #[test]
    fn test_error_response_client_errors_have_no_details() {
        let err = TeamLogError::Validation(ValidationError::InvalidScore {
            field: "engagement_score",
        });
        let (status, body) = error_response(&err, "Failed to create team log");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid score for engagement_score. Must be a number between 0 and 100"
        );
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_error_response_not_found_and_duplicate() {
        let not_found = TeamLogError::NotFound {
            member_id: "m1".to_string(),
            session_id: "s1".to_string(),
        };
        let (status, body) = error_response(&not_found, "Failed to update team log");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Log not found");

        let duplicate = TeamLogError::Duplicate {
            member_id: "m1".to_string(),
            session_id: "s1".to_string(),
        };
        let (status, _) = error_response(&duplicate, "Failed to create team log");
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_response_store_failure_includes_details() {
        let err = TeamLogError::Database(sqlx::Error::PoolTimedOut);
        let (status, body) = error_response(&err, "Failed to fetch team logs");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch team logs");
        assert!(body["details"].as_str().unwrap().contains("pool timed out"));
    }

    #[tokio::test]
    async fn test_create_inner_echoes_fields_and_timestamps() {
        let state = make_state();
        let (status, body) = create_inner(&state, scenario_body()).await;

        assert_eq!(status, StatusCode::OK, "body: {:?}", body);
        assert_eq!(body["session_id"], "s1");
        assert_eq!(body["user_name"], "Alice");
        assert_eq!(body["agent_name"], "Bot");
        assert_eq!(body["overall_score"], 85.0);
        assert_eq!(body["engagement_score"], 70.0);
        assert!(body["created_at"].is_string());
        assert!(body["updated_at"].is_string());
        assert!(body["manager_feedback"].is_null());
    }

    #[tokio::test]
    async fn test_create_inner_rejects_wrong_field_type() {
        let state = make_state();
        let mut payload = scenario_body();
        payload["user_name"] = serde_json::json!(42);

        let (status, body) = create_inner(&state, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[test]
    fn test_params_keep_first_of_repeated_keys() {
        let pairs: QueryPairs = vec![
            ("teamId".to_string(), "t1".to_string()),
            ("memberId".to_string(), "m1".to_string()),
            ("teamId".to_string(), "t2".to_string()),
        ];
        let params = ListParams::from_pairs(&pairs);
        assert_eq!(params.team_id.as_deref(), Some("t1"));
        assert_eq!(params.member_id.as_deref(), Some("m1"));

        let params = AnnotateParams::from_pairs(&pairs);
        assert!(params.member_id.is_none());
        assert!(params.session_id.is_none());
    }

    #[tokio::test]
    async fn test_create_inner_rejects_non_object_body() {
        let state = make_state();
        for payload in [serde_json::json!([1, 2]), serde_json::json!("s1"), serde_json::json!(7)] {
            let (status, body) = create_inner(&state, payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "Invalid request body: expected a JSON object");
        }
    }

    #[tokio::test]
    async fn test_list_inner_missing_params() {
        let state = make_state();
        let params = ListParams {
            team_id: Some("t1".to_string()),
            member_id: None,
        };
        let (status, body) = list_inner(&state, params).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Team ID and Member ID required");
    }

    #[tokio::test]
    async fn test_annotate_inner_requires_feedback_string() {
        let state = make_state();
        create_inner(&state, scenario_body()).await;

        let params = AnnotateParams {
            member_id: Some("m1".to_string()),
            session_id: Some("s1".to_string()),
        };
        let (status, body) =
            annotate_inner(&state, params, serde_json::json!({"manager_feedback": 5})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Manager feedback required");
    }

    #[tokio::test]
    async fn test_health_inner_memory_store() {
        let state = make_state();
        let (status, body) = health_inner(state.store.as_ref()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "memory");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
