//! Push payload interpretation.
//!
//! The payload shape is a convention between whoever calls the relay and
//! this worker: a JSON object with `title`, `body`, and optional `icon`,
//! `badge`, `data`. Anything that does not parse as a JSON object is
//! replaced by [`PushPayload::fallback`]; within an object each field is
//! read on its own, so one odd field never discards the others.

use serde_json::{Map, Value};

/// Title shown when the push data is absent or unreadable.
pub const FALLBACK_TITLE: &str = "Push Notification";

/// Body shown when the push data is absent or unreadable.
pub const FALLBACK_BODY: &str = "You have a new update.";

/// Icon used when the payload names none.
pub const FALLBACK_ICON: &str = "https://placehold.co/192x192/007bff/white?text=CF";

/// Notification payload as sent by the relay's caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    /// Opaque value handed to the notification untouched.
    pub data: Option<Value>,
}

/// Everything besides the title that goes into `showNotification`.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub body: Option<String>,
    pub icon: String,
    pub badge: Option<String>,
    pub data: Option<Value>,
}

impl PushPayload {
    /// Payload used when the event carries nothing usable.
    pub fn fallback() -> Self {
        Self {
            title: Some(FALLBACK_TITLE.to_string()),
            body: Some(FALLBACK_BODY.to_string()),
            ..Self::default()
        }
    }

    /// Interpret the text attached to a push event.
    ///
    /// Absent data, invalid JSON, or a JSON value that is not an object
    /// resolve to [`PushPayload::fallback`].
    pub fn from_push_data(data: Option<&str>) -> Self {
        match data.and_then(|text| serde_json::from_str::<Value>(text).ok()) {
            Some(Value::Object(fields)) => Self::from_fields(&fields),
            _ => Self::fallback(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            title: text_field(fields, "title"),
            body: text_field(fields, "body"),
            icon: text_field(fields, "icon"),
            badge: text_field(fields, "badge"),
            data: fields.get("data").filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Notification title. Empty when the payload has none.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Options for `showNotification`, with the placeholder icon filled in.
    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            body: self.body.clone(),
            icon: self
                .icon
                .clone()
                .filter(|icon| !icon.is_empty())
                .unwrap_or_else(|| FALLBACK_ICON.to_string()),
            badge: self.badge.clone(),
            data: self.data.clone(),
        }
    }
}

/// Strings as-is, numbers and booleans in their JSON text form.
/// Anything else counts as absent.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(text) => Some(text.clone()),
        scalar @ (Value::Number(_) | Value::Bool(_)) => Some(scalar.to_string()),
        _ => None,
    }
}
