//! Web push message sending.
//!
//! Encrypts a payload for one browser subscription (RFC 8291), signs the
//! request with VAPID (RFC 8292), and sends it to the push service
//! (RFC 8030). The [`PushSender`] trait is the seam the HTTP handler talks to.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use web_push::{
    ContentEncoding, SubscriptionInfo, VapidSignatureBuilder, WebPushMessage, WebPushMessageBuilder,
};

use super::vapid::VapidCredentials;
use crate::config::Config;
use crate::constants::{DEFAULT_PAYLOAD_BODY, DEFAULT_PAYLOAD_TITLE};

/// A browser's push subscription, exactly as `PushSubscription.toJSON()`
/// produces it.
///
/// Every field is optional at this layer so that a missing endpoint can be
/// reported as such rather than as a parse failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    /// Push service endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Message encryption keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<SubscriptionKeys>,
}

/// Client keys used for payload encryption.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Browser's P-256 ECDH public key (base64url).
    #[serde(default)]
    pub p256dh: Option<String>,
    /// Shared auth secret (base64url).
    #[serde(default)]
    pub auth: Option<String>,
}

impl PushSubscription {
    /// Subscription pointing at `endpoint` with the given keys.
    pub fn new(endpoint: &str, p256dh: &str, auth: &str) -> Self {
        Self {
            endpoint: Some(endpoint.to_string()),
            keys: Some(SubscriptionKeys {
                p256dh: Some(p256dh.to_string()),
                auth: Some(auth.to_string()),
            }),
        }
    }

    /// The endpoint, if present and non-empty.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }

    /// `(p256dh, auth)` when both are present and non-empty.
    pub fn encryption_keys(&self) -> Option<(&str, &str)> {
        let keys = self.keys.as_ref()?;
        let p256dh = keys.p256dh.as_deref().filter(|k| !k.is_empty())?;
        let auth = keys.auth.as_deref().filter(|k| !k.is_empty())?;
        Some((p256dh, auth))
    }
}

/// Payload sent when the caller supplied none.
pub fn default_payload() -> Value {
    json!({
        "title": DEFAULT_PAYLOAD_TITLE,
        "body": DEFAULT_PAYLOAD_BODY,
    })
}

/// Serialize the caller's payload, substituting [`default_payload`] when it
/// is absent or `null`.
pub fn serialize_payload(payload: Option<&Value>) -> Result<String> {
    let text = match payload {
        Some(value) if !value.is_null() => serde_json::to_string(value),
        _ => serde_json::to_string(&default_payload()),
    };
    text.context("Failed to serialize notification payload")
}

/// What the push service said about a well-formed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The push service accepted the message (2xx).
    Delivered,
    /// The subscription is permanently invalid (410 Gone).
    Gone,
}

/// The push-delivery capability.
///
/// Implementations own all network I/O and cryptography. Any failure other
/// than a gone subscription is returned as an error.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver `payload` to `subscription`, signed with `credentials`.
    async fn send(
        &self,
        credentials: &VapidCredentials,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<Delivery>;
}

/// [`PushSender`] backed by the `web-push` crate for encryption and signing,
/// and `reqwest` for transport.
///
/// Holds one `reqwest::Client`, so connections are pooled across requests.
#[derive(Debug, Clone)]
pub struct WebPushSender {
    client: reqwest::Client,
    ttl: u32,
}

impl WebPushSender {
    /// Build a sender with the given message TTL and request timeout.
    pub fn new(ttl: u32, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, ttl })
    }

    /// Build a sender from the relay configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.ttl_secs, Duration::from_secs(config.request_timeout_secs))
    }

    /// POST carrying the encrypted body and its RFC 8291 headers.
    fn request_for(&self, message: WebPushMessage) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        let Some(encrypted) = message.payload else {
            return request;
        };

        let request = request
            .header(CONTENT_ENCODING, encrypted.content_encoding.to_str())
            .header(CONTENT_TYPE, "application/octet-stream");
        encrypted
            .crypto_headers
            .iter()
            .fold(request, |request, (name, value)| request.header(*name, value.as_str()))
            .body(encrypted.content)
    }
}

/// Only 2xx and 410 are outcomes; every other status is an error carrying
/// the push service's response body.
async fn delivery_outcome(response: reqwest::Response) -> Result<Delivery> {
    let status = response.status();

    if status.is_success() {
        log::debug!("[WebPush] Delivered (HTTP {})", status.as_u16());
        return Ok(Delivery::Delivered);
    }
    if status == StatusCode::GONE {
        log::info!("[WebPush] Subscription expired (410 Gone)");
        return Ok(Delivery::Gone);
    }

    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("Web push send failed (HTTP {}): {body}", status.as_u16())
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(
        &self,
        credentials: &VapidCredentials,
        subscription: &PushSubscription,
        payload: &[u8],
    ) -> Result<Delivery> {
        let endpoint = subscription
            .endpoint()
            .context("Subscription has no endpoint")?;
        let (p256dh, auth) = subscription.encryption_keys().context(
            "To send a message with a payload, the subscription must have 'auth' and 'p256dh' keys",
        )?;
        let keys = credentials.keys().context("Invalid VAPID credentials")?;

        let sub_info = SubscriptionInfo::new(endpoint, p256dh, auth);

        let mut sig_builder = VapidSignatureBuilder::from_base64(keys.private_key_base64url(), &sub_info)
            .context("Failed to build VAPID signature")?;
        sig_builder.add_claim("sub", credentials.subject());
        let sig = sig_builder.build().context("Failed to sign VAPID JWT")?;

        let mut builder = WebPushMessageBuilder::new(&sub_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload);
        builder.set_vapid_signature(sig);
        builder.set_ttl(self.ttl);

        let message = builder.build().context("Failed to build web push message")?;

        let response = self
            .request_for(message)
            .send()
            .await
            .context("Web push HTTP request failed")?;

        delivery_outcome(response).await
    }
}
