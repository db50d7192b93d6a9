//! The outcome race: a retrying fetch against a hard deadline.

use crate::retry;
use crate::transport::{RequestDescriptor, Transport, TransportResponse};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Per-call state shared between the deadline timer and the retry driver.
///
/// The deadline-fired flag is written at most once, by the timer arm, and
/// read by the retry driver between attempts.
#[derive(Debug, Clone)]
pub(crate) struct RequestState {
    /// The resolved URL this call targets.
    pub url: String,
    deadline_fired: Arc<AtomicBool>,
}

impl RequestState {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            deadline_fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn deadline_fired(&self) -> bool {
        self.deadline_fired.load(Ordering::Relaxed)
    }

    pub(crate) fn mark_deadline_fired(&self) {
        self.deadline_fired.store(true, Ordering::Relaxed);
    }
}

/// Exactly one raw outcome is produced per call.
pub(crate) enum RawOutcome {
    /// A real transport response, whatever its status.
    Response(Box<dyn TransportResponse>),
    /// The deadline fired before any response arrived.
    TimedOut,
    /// Retries exhausted without ever obtaining a response.
    Absent,
}

/// Run the retry driver against the deadline timer; whichever finishes first
/// supplies the outcome.
///
/// The driver runs as a detached task so a timeout can settle the call while
/// the transport is still waiting; the driver then observes the
/// deadline-fired flag and discards its own result rather than resolving the
/// call a second time. Dropping the losing `sleep` future cancels the timer
/// on every exit path.
pub(crate) async fn run(
    transport: Arc<dyn Transport>,
    state: RequestState,
    request: RequestDescriptor,
    retries: u32,
    deadline: Duration,
) -> RawOutcome {
    let driver = tokio::spawn(retry::drive(transport, state.clone(), request, retries));

    tokio::select! {
        _ = tokio::time::sleep(deadline) => {
            state.mark_deadline_fired();
            tracing::debug!(url = %state.url, ?deadline, "deadline fired before a response");
            RawOutcome::TimedOut
        }
        outcome = driver => match outcome {
            Ok(Some(response)) => RawOutcome::Response(response),
            Ok(None) => RawOutcome::Absent,
            Err(err) => {
                tracing::warn!(url = %state.url, error = %err, "retry driver task failed");
                RawOutcome::Absent
            }
        }
    }
}
