//! HTTP surface of the relay.
//!
//! A single route, `/send-push`, accepting `POST` (deliver) and `OPTIONS`
//! (CORS preflight). Every response carries permissive CORS headers so
//! browser pages on any origin can call the relay directly.

pub mod handlers;

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue},
    routing::post,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;
use crate::constants::{CORS_ALLOW_HEADERS, CORS_ALLOW_METHODS, CORS_ALLOW_ORIGIN, SEND_PUSH_PATH};
use crate::notifications::push::{PushSender, WebPushSender};

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Relay configuration, including the VAPID credential set.
    pub config: Arc<Config>,
    /// Push-delivery capability.
    pub sender: Arc<dyn PushSender>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Bundle configuration and sender.
    pub fn new(config: Arc<Config>, sender: Arc<dyn PushSender>) -> Self {
        Self { config, sender }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            SEND_PUSH_PATH,
            post(handlers::send_push).options(handlers::preflight),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(CORS_ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(CORS_ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(CORS_ALLOW_METHODS),
        ))
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: Config) -> Result<()> {
    if config.vapid.credentials().is_none() {
        log::warn!("[Relay] VAPID keys are not configured; every /send-push request will fail with 500");
    }

    let sender = WebPushSender::from_config(&config)?;
    let addr = config.listen_addr;
    let state = AppState::new(Arc::new(config), Arc::new(sender));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("[Relay] Listening on http://{addr}{SEND_PUSH_PATH}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    log::info!("[Relay] Shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[Relay] Failed to listen for Ctrl-C: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("[Relay] Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    log::info!("[Relay] Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_VAPID_PRIVATE_KEY, ENV_VAPID_PUBLIC_KEY};
    use crate::delivery::tests::{RecordingSender, Reply};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    fn configured() -> Arc<Config> {
        Arc::new(Config::from_lookup(|key| match key {
            ENV_VAPID_PUBLIC_KEY => Some("pub".to_string()),
            ENV_VAPID_PRIVATE_KEY => Some("priv".to_string()),
            _ => None,
        }))
    }

    fn unconfigured() -> Arc<Config> {
        Arc::new(Config::from_lookup(|_| None))
    }

    async fn post(config: Arc<Config>, sender: Arc<RecordingSender>, body: &str) -> Response {
        let app = router(AppState::new(config, sender));
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(SEND_PUSH_PATH)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
        .expect("router is infallible")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    }

    #[tokio::test]
    async fn test_preflight_is_empty_204() {
        let sender = Arc::new(RecordingSender::new(Reply::Delivered));
        let shared: Arc<RecordingSender> = Arc::clone(&sender);
        let app = router(AppState::new(unconfigured(), shared));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri(SEND_PUSH_PATH)
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors(&response);
        assert_eq!(response.headers()["access-control-max-age"], "86400");

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert!(bytes.is_empty());
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_post_delivers_and_confirms() {
        let sender = Arc::new(RecordingSender::new(Reply::Delivered));
        let response = post(
            configured(),
            Arc::clone(&sender),
            r#"{"subscription":{"endpoint":"https://push.example/abc"},"payload":{"title":"Hi","body":"there"}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert_eq!(response.headers()["content-type"], "application/json");

        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Notification sent successfully.");
        assert!(body.get("error").is_none());

        let calls = sender.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload, r#"{"title":"Hi","body":"there"}"#);
    }

    #[tokio::test]
    async fn test_missing_keys_is_500_even_for_valid_body() {
        let sender = Arc::new(RecordingSender::new(Reply::Delivered));
        let response = post(
            unconfigured(),
            Arc::clone(&sender),
            r#"{"subscription":{"endpoint":"https://push.example/abc"}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Missing VAPID keys in server configuration");
        assert!(body.get("details").is_none());
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_400() {
        let sender = Arc::new(RecordingSender::new(Reply::Delivered));
        let response = post(configured(), Arc::clone(&sender), r#"{"payload":{"title":"x"}}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Missing subscription object");
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let sender = Arc::new(RecordingSender::new(Reply::Delivered));
        let response = post(configured(), Arc::clone(&sender), "{\"subscription\":").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Invalid JSON body")));
        assert!(sender.calls().is_empty());
    }

    #[tokio::test]
    async fn test_gone_is_410() {
        let sender = Arc::new(RecordingSender::new(Reply::Gone));
        let response = post(
            configured(),
            sender,
            r#"{"subscription":{"endpoint":"https://push.example/abc"}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::GONE);
        assert_cors(&response);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Subscription is no longer valid (Gone).");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_500_with_details() {
        let sender = Arc::new(RecordingSender::new(Reply::Fail));
        let response = post(
            configured(),
            sender,
            r#"{"subscription":{"endpoint":"https://push.example/abc"}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to send notification.");
        assert_eq!(body["details"], "Web push send failed (HTTP 500): boom");
    }

    #[tokio::test]
    async fn test_other_methods_rejected_with_cors() {
        let sender = Arc::new(RecordingSender::new(Reply::Delivered));
        let app = router(AppState::new(configured(), sender));

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(SEND_PUSH_PATH)
                    .body(Body::empty())
                    .expect("build request"),
            )
            .await
            .expect("router is infallible");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_cors(&response);
    }
}
