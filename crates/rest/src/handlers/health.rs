//! Health check endpoint handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use feedkeeper_persistence::core::FeedStorage;
use tracing::debug;

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// # HTTP Request
///
/// `GET /health`
///
/// # Response
///
/// - `200 OK` with the status, storage backend and server time
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> Response
where
    S: FeedStorage,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": state.storage().backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(health_response)).into_response()
}
