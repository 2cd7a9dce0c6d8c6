//! `/send-push` route handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::constants::{CORS_MAX_AGE_SECS, MSG_SENT};
use crate::delivery::{self, RelayError};

/// Body of a 200 response.
#[derive(Debug, Serialize)]
pub struct SendPushResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable reason.
    pub error: String,
    /// Underlying error chain for generic delivery failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Relay one notification.
///
/// # Endpoint
///
/// POST /send-push
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8787/send-push \
///   -H "Content-Type: application/json" \
///   -d '{"subscription": {"endpoint": "...", "keys": {"p256dh": "...", "auth": "..."}},
///        "payload": {"title": "Hi", "body": "there"}}'
/// ```
pub async fn send_push(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SendPushResponse>, RelayError> {
    let credentials = state.config.vapid.credentials();

    delivery::handle_request(state.sender.as_ref(), credentials.as_ref(), &body).await?;

    Ok(Json(SendPushResponse {
        success: true,
        message: MSG_SENT.to_string(),
    }))
}

/// Answer the CORS preflight probe.
///
/// The `Access-Control-Allow-*` headers come from the router-wide layer;
/// only the cache directive is specific to preflight.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(CORS_MAX_AGE_SECS))],
    )
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::InvalidBody(_) | RelayError::MissingSubscription => StatusCode::BAD_REQUEST,
            RelayError::SubscriptionGone => StatusCode::GONE,
            RelayError::MissingCredentials | RelayError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        log::debug!("[Relay] Responding {status}: {self}");

        let body = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}
