//! A scripted in-memory transport for failure and timing scenarios.

use async_trait::async_trait;
use courier_client::{RequestDescriptor, Transport, TransportError, TransportResponse};
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// The response one scripted attempt produces.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    /// Content type header, when the response carries one.
    pub content_type: Option<String>,
    pub body: String,
}

impl ScriptedResponse {
    /// A JSON response with the given status.
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    /// A plain-text response with the given status.
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.to_string(),
        }
    }
}

/// What one attempt does.
#[derive(Debug, Clone)]
pub enum Step {
    /// The attempt fails at the transport level.
    Fail(String),
    /// The attempt answers immediately.
    Respond(ScriptedResponse),
    /// The attempt answers after a pause (long enough pauses let the
    /// deadline win).
    Delay(Duration, ScriptedResponse),
}

/// A [`Transport`] that plays back a script, one step per attempt, counting
/// attempts as it goes. When the script runs out, further attempts fail.
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    attempts: AtomicUsize,
    exhausted_message: String,
}

impl ScriptedTransport {
    /// Create a transport from a script. Attempts past the end of the script
    /// fail.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            attempts: AtomicUsize::new(0),
            exhausted_message: "script exhausted".to_string(),
        }
    }

    /// A transport whose every attempt fails with the given message.
    pub fn always_failing(message: &str) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
            exhausted_message: message.to_string(),
        }
    }

    /// How many attempts have been made so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn attempt(
        &self,
        _url: &str,
        _request: &RequestDescriptor,
    ) -> Result<Box<dyn TransportResponse>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Fail(message)) => Err(TransportError::Failed(message)),
            Some(Step::Respond(response)) => Ok(Box::new(StaticResponse::from(response))),
            Some(Step::Delay(pause, response)) => {
                tokio::time::sleep(pause).await;
                Ok(Box::new(StaticResponse::from(response)))
            }
            None => Err(TransportError::Failed(self.exhausted_message.clone())),
        }
    }
}

/// A fully-materialized transport response.
pub struct StaticResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl From<ScriptedResponse> for StaticResponse {
    fn from(scripted: ScriptedResponse) -> Self {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = &scripted.content_type {
            if let Ok(value) = HeaderValue::try_from(content_type.as_str()) {
                headers.insert("content-type", value);
            }
        }
        Self {
            status: scripted.status,
            headers,
            body: scripted.body,
        }
    }
}

#[async_trait]
impl TransportResponse for StaticResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    async fn text(self: Box<Self>) -> Result<String, TransportError> {
        Ok(self.body)
    }
}
