//! Notifier fakes for asserting lifecycle sequences.

use courier_client::{Notification, Notifier, NotifyError, ResultEnvelope};
use parking_lot::Mutex;

/// A [`Notifier`] that records every notification it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The reasons received so far, in order.
    pub fn reasons(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(|n| n.reason()).collect()
    }

    /// Whether any notification with this reason was received.
    pub fn saw(&self, reason: &str) -> bool {
        self.reasons().contains(&reason)
    }

    /// The envelope carried by the first notification with this reason.
    pub fn envelope_for(&self, reason: &str) -> Option<ResultEnvelope> {
        self.events.lock().iter().find_map(|n| match n {
            Notification::Feedback(envelope) | Notification::Logout(envelope)
                if n.reason() == reason =>
            {
                Some(envelope.clone())
            }
            _ => None,
        })
    }

    /// Total notifications received.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events.lock().push(notification);
        Ok(())
    }
}

/// A [`Notifier`] whose callback always fails. Calls emitting through it must
/// still complete normally.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError("notification sink unavailable".to_string()))
    }
}
