//! Browser bindings for the listener traits.
//!
//! Event listeners have to be registered synchronously while the worker
//! script is first evaluated, before the wasm module has finished loading.
//! `www/sw.js` therefore registers them in JavaScript and forwards each
//! event to the exports below once the module is ready.

use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    ExtendableEvent, Notification, NotificationEvent, NotificationOptions, PushEvent,
    ServiceWorkerGlobalScope, ServiceWorkerRegistration,
};

use crate::listener::{self, Dismiss, LifetimeExtender, NotificationDisplay};
use crate::payload::DisplayOptions;
use crate::ListenerError;

impl NotificationDisplay for ServiceWorkerRegistration {
    type Pending = Promise;

    fn show_notification(
        &self,
        title: &str,
        options: &DisplayOptions,
    ) -> Result<Promise, ListenerError> {
        let js_options = NotificationOptions::new();
        if let Some(body) = &options.body {
            js_options.set_body(body);
        }
        js_options.set_icon(&options.icon);
        if let Some(badge) = &options.badge {
            js_options.set_badge(badge);
        }
        if let Some(data) = &options.data {
            // json_compatible turns objects into plain JS objects instead of Maps
            let value = data
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|e| ListenerError::Serialization(e.to_string()))?;
            js_options.set_data(&value);
        }

        self.show_notification_with_options(title, &js_options)
            .map_err(|e| ListenerError::Display(format!("{e:?}")))
    }
}

impl LifetimeExtender<Promise> for PushEvent {
    fn wait_until(&self, pending: Promise) -> Result<(), ListenerError> {
        ExtendableEvent::wait_until(self, &pending)
            .map_err(|e| ListenerError::KeepAlive(format!("{e:?}")))
    }
}

impl Dismiss for Notification {
    fn dismiss(&self) {
        self.close();
    }
}

/// Handle a `push` event forwarded from the worker script.
#[wasm_bindgen(js_name = "handlePush")]
pub fn handle_push(event: PushEvent) -> Result<(), JsValue> {
    let scope: ServiceWorkerGlobalScope = js_sys::global().unchecked_into();
    let data = event.data().map(|data| data.text());

    listener::on_push(&scope.registration(), &event, data.as_deref()).map_err(JsValue::from)
}

/// Handle a `notificationclick` event forwarded from the worker script.
#[wasm_bindgen(js_name = "handleNotificationClick")]
pub fn handle_notification_click(event: NotificationEvent) {
    listener::on_notification_click(&event.notification());
}
