//! Service worker event handling, independent of the browser bindings.
//!
//! The handlers talk to the platform through three small traits so the same
//! logic runs against `web-sys` types in the worker and against fakes in
//! native tests.

use crate::payload::{DisplayOptions, PushPayload};
use crate::ListenerError;

/// Something that can show a notification.
///
/// Showing is asynchronous in the browser, so the call returns a pending
/// operation rather than waiting for it.
pub trait NotificationDisplay {
    /// Handle to the in-flight display operation (a `Promise` in the browser).
    type Pending;

    /// Start displaying `title` with `options`.
    fn show_notification(
        &self,
        title: &str,
        options: &DisplayOptions,
    ) -> Result<Self::Pending, ListenerError>;
}

/// An event whose lifetime can be extended until a pending operation settles
/// (`ExtendableEvent.waitUntil`).
pub trait LifetimeExtender<P> {
    /// Keep the event alive until `pending` completes.
    fn wait_until(&self, pending: P) -> Result<(), ListenerError>;
}

/// A shown notification that can be closed.
pub trait Dismiss {
    /// Close the notification.
    fn dismiss(&self);
}

/// Handle a `push` event.
///
/// Resolves the payload (falling back on unreadable data), starts exactly one
/// display operation, and hands it to `event` so the worker stays alive until
/// the notification is on screen.
pub fn on_push<D, E>(display: &D, event: &E, data: Option<&str>) -> Result<(), ListenerError>
where
    D: NotificationDisplay,
    E: LifetimeExtender<D::Pending>,
{
    let payload = PushPayload::from_push_data(data);
    let options = payload.display_options();

    let pending = display.show_notification(payload.title(), &options)?;
    event.wait_until(pending)
}

/// Handle a `notificationclick` event: close the notification, nothing more.
pub fn on_notification_click<N: Dismiss>(notification: &N) {
    notification.dismiss();
}
