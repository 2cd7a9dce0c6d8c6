//! Application-wide constants for web-push-relay.
//!
//! This module centralizes the fixed strings and numbers the relay depends
//! on so they are discoverable in one place. Constants are grouped by domain.
//!
//! # Categories
//!
//! - **Routes & CORS**: HTTP surface shape and cross-origin policy
//! - **Push**: Web Push delivery parameters
//! - **Defaults**: Fallback values substituted for missing input
//! - **Responses**: User-visible messages in JSON bodies

use std::time::Duration;

// ============================================================================
// Routes & CORS
// ============================================================================

/// Path of the single delivery endpoint.
pub const SEND_PUSH_PATH: &str = "/send-push";

/// Value of `Access-Control-Allow-Origin` on every response.
pub const CORS_ALLOW_ORIGIN: &str = "*";

/// Value of `Access-Control-Allow-Headers` on every response.
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

/// Value of `Access-Control-Allow-Methods` on every response.
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";

/// How long browsers may cache the preflight result (`Access-Control-Max-Age`).
///
/// 86400 seconds (one day). Browsers clamp this to their own ceiling.
pub const CORS_MAX_AGE_SECS: u64 = 86_400;

// ============================================================================
// Push
// ============================================================================

/// Default time-to-live the push service keeps an undelivered message.
///
/// Four weeks, the conventional Web Push library default.
pub const DEFAULT_PUSH_TTL_SECS: u32 = 2_419_200;

/// Timeout for the outbound request to the push service.
pub const DEFAULT_PUSH_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bind address for `serve`.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8787";

// ============================================================================
// Defaults
// ============================================================================

/// Contact subject used when the operator configured none.
pub const DEFAULT_VAPID_SUBJECT: &str = "mailto:example@yourdomain.org";

/// Title of the payload sent when the caller supplied none.
pub const DEFAULT_PAYLOAD_TITLE: &str = "Default Title";

/// Body of the payload sent when the caller supplied none.
pub const DEFAULT_PAYLOAD_BODY: &str = "Default notification body";

// ============================================================================
// Responses
// ============================================================================

/// Success confirmation in the 200 body.
pub const MSG_SENT: &str = "Notification sent successfully.";

/// Error for a request without `subscription.endpoint`.
pub const MSG_MISSING_SUBSCRIPTION: &str = "Missing subscription object";

/// Error when either VAPID key is absent from configuration.
pub const MSG_MISSING_CREDENTIALS: &str = "Missing VAPID keys in server configuration";

/// Error when the push service reports the subscription gone.
pub const MSG_SUBSCRIPTION_GONE: &str = "Subscription is no longer valid (Gone).";

/// Error for every other delivery failure. Details go in a separate field.
pub const MSG_DELIVERY_FAILED: &str = "Failed to send notification.";
