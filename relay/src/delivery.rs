//! Request validation and outcome mapping for a single push delivery.
//!
//! This is the transport-independent core of `POST /send-push`: both the HTTP
//! handler and the `send` CLI command go through [`deliver`], so the checks
//! run in the same order and produce the same [`RelayError`] variants.
//!
//! Order of checks, each of which stops before any network I/O:
//!
//! 1. credentials present in configuration
//! 2. body parses as JSON
//! 3. `subscription.endpoint` present and non-empty

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{
    MSG_DELIVERY_FAILED, MSG_MISSING_CREDENTIALS, MSG_MISSING_SUBSCRIPTION,
    MSG_SUBSCRIPTION_GONE,
};
use crate::notifications::push::{serialize_payload, Delivery, PushSender, PushSubscription};
use crate::notifications::vapid::VapidCredentials;

/// Body of `POST /send-push`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendPushRequest {
    /// Target browser subscription.
    #[serde(default)]
    pub subscription: Option<PushSubscription>,
    /// Caller-defined notification payload. `None` selects the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Why a delivery request did not succeed.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Either VAPID key is missing from configuration.
    #[error("{}", MSG_MISSING_CREDENTIALS)]
    MissingCredentials,

    /// The body is not valid JSON of the expected shape.
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    /// No subscription, or a subscription without an endpoint.
    #[error("{}", MSG_MISSING_SUBSCRIPTION)]
    MissingSubscription,

    /// The push service answered 410 Gone; the caller should drop it.
    #[error("{}", MSG_SUBSCRIPTION_GONE)]
    SubscriptionGone,

    /// Any other failure while building or sending the message.
    #[error("{}", MSG_DELIVERY_FAILED)]
    Delivery(anyhow::Error),
}

impl RelayError {
    /// Diagnostic text for the `details` field, if this variant carries one.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Delivery(err) => Some(format!("{err:#}")),
            _ => None,
        }
    }
}

/// Validate a raw request body and deliver it.
///
/// `credentials` is `None` when configuration lacks a key; that is checked
/// before the body is even parsed.
pub async fn handle_request(
    sender: &dyn PushSender,
    credentials: Option<&VapidCredentials>,
    body: &[u8],
) -> Result<(), RelayError> {
    let credentials = credentials.ok_or(RelayError::MissingCredentials)?;

    let request: SendPushRequest =
        serde_json::from_slice(body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;

    deliver(sender, credentials, request).await
}

/// Deliver an already parsed request.
pub async fn deliver(
    sender: &dyn PushSender,
    credentials: &VapidCredentials,
    request: SendPushRequest,
) -> Result<(), RelayError> {
    let subscription = request
        .subscription
        .filter(|s| s.endpoint().is_some())
        .ok_or(RelayError::MissingSubscription)?;

    let payload = serialize_payload(request.payload.as_ref()).map_err(RelayError::Delivery)?;

    match sender.send(credentials, &subscription, payload.as_bytes()).await {
        Ok(Delivery::Delivered) => Ok(()),
        Ok(Delivery::Gone) => Err(RelayError::SubscriptionGone),
        Err(err) => {
            log::error!("[Relay] Error sending push: {err:#}");
            Err(RelayError::Delivery(err))
        }
    }
}
