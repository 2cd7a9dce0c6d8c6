//! WebAssembly service worker for relayed Web Push notifications.
//!
//! Receives the messages `web-push-relay` sends and turns them into visible
//! notifications.
//!
//! # Event Flow
//!
//! ```text
//! Push service                 Service worker (this crate)
//! ─────────────────────────────────────────────────────────
//! push event ───────────────►  parse JSON payload (or fall back)
//!                              showNotification(title, options)
//!                              event.waitUntil(display promise)
//!
//! user clicks ──────────────►  notification.close()
//! ```
//!
//! The logic in [`listener`] and [`payload`] is plain Rust; only the
//! `worker` module touches browser APIs and is compiled for `wasm32` alone.

use thiserror::Error;
use wasm_bindgen::prelude::*;

pub mod listener;
pub mod payload;
#[cfg(target_arch = "wasm32")]
mod worker;

pub use listener::{on_notification_click, on_push, Dismiss, LifetimeExtender, NotificationDisplay};
pub use payload::{DisplayOptions, PushPayload};

/// Errors raised while handling a service worker event.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Failed to show notification: {0}")]
    Display(String),
    #[error("Failed to extend event lifetime: {0}")]
    KeepAlive(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ListenerError> for JsValue {
    fn from(err: ListenerError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
}
