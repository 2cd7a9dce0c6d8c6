//! web-push-relay - signs Web Push requests and forwards them.
//!
//! Accepts a browser push subscription plus a notification payload, signs the
//! message with the operator's VAPID keys, encrypts it for the subscriber,
//! and hands it to the push service named in the subscription endpoint.
//!
//! # Modules
//!
//! - [`server`] - axum router for `POST /send-push` and its CORS preflight
//! - [`delivery`] - request validation and outcome mapping
//! - [`notifications`] - VAPID keys and the web push sender
//! - [`config`] - configuration loading
//! - [`constants`] - fixed defaults and response messages

pub mod config;
pub mod constants;
pub mod delivery;
pub mod notifications;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use delivery::{RelayError, SendPushRequest};
pub use notifications::push::{Delivery, PushSender, PushSubscription, WebPushSender};
pub use notifications::vapid::{VapidCredentials, VapidKeys};
