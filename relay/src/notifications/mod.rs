//! Web push notification delivery.
//!
//! Relays one caller-supplied payload to one browser push subscription,
//! signed with the operator's VAPID keys. Nothing is stored: the
//! subscription arrives with the request and is forgotten afterwards.
//!
//! # Architecture
//!
//! ```text
//! Caller POSTs {subscription, payload}
//!     ↓
//! Relay encrypts (RFC 8291) + signs (RFC 8292)
//!     ↓
//! Push service (RFC 8030) delivers to the browser
//!     ↓
//! Service worker shows the notification
//! ```
//!
//! # VAPID Keys
//!
//! The operator generates a P-256 keypair once (`generate-vapid-keys`) and
//! configures it through the environment. The public key is also given to
//! browsers as `applicationServerKey` when they subscribe.

pub mod push;
pub mod vapid;
