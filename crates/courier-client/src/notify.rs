//! Lifecycle notifications.

use crate::envelope::ResultEnvelope;

/// A lifecycle event emitted during one call.
///
/// Per-call order is fixed: clear, start, logout (401 only), feedback, stop,
/// login (thrown 401 only). Notifications from independent calls may
/// interleave; there is no serialization across calls.
#[derive(Debug, Clone)]
pub enum Notification {
    /// The caller asked for prior feedback state to be cleared.
    Clear,
    /// The network phase is starting.
    Start,
    /// The network phase has finished, on every exit path.
    Stop,
    /// An outcome worth surfacing to the user, carrying the envelope.
    Feedback(ResultEnvelope),
    /// The server answered 401; the session is gone.
    Logout(ResultEnvelope),
    /// A 401 outcome is about to be raised as an error.
    Login,
}

impl Notification {
    /// The wire name of this notification.
    pub fn reason(&self) -> &'static str {
        match self {
            Notification::Clear => "clear",
            Notification::Start => "start",
            Notification::Stop => "stop",
            Notification::Feedback(_) => "feedback",
            Notification::Logout(_) => "logout",
            Notification::Login => "login",
        }
    }
}

/// Notifier failure. Never affects the call that emitted it.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct NotifyError(pub String);

/// Caller-supplied notification sink.
pub trait Notifier: Send + Sync {
    /// React to a lifecycle event. Failures are logged and swallowed by the
    /// emitting call.
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// A notifier that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Emit a notification, swallowing sink failures.
pub(crate) fn emit(notifier: &dyn Notifier, notification: Notification) {
    let reason = notification.reason();
    if let Err(err) = notifier.notify(notification) {
        tracing::debug!(reason, error = %err, "notifier callback failed");
    }
}
