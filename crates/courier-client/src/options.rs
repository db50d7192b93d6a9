//! Per-call request options.

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;

/// Options for a single request.
///
/// Every recognized option is an explicit field with a documented default.
/// The facade merges these over [`ClientConfig`](crate::config::ClientConfig)
/// defaults for one call; the caller's value is never mutated.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method. Defaults to POST when unset.
    pub method: Option<Method>,
    /// JSON request body.
    pub body: Option<Value>,
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Transport mode hint (browser-style transports honor it). Defaults to "cors".
    pub mode: Option<String>,
    /// Additional attempts after the first failed attempt. Only transport
    /// failures are retried, never non-200 statuses.
    pub retries: u32,
    /// Emit a `Clear` notification before the call.
    pub clear: bool,
    /// `Some(false)` suppresses feedback notifications entirely; otherwise
    /// feedback fires when the outcome is an error.
    pub feedback: Option<bool>,
    /// Log classified errors via tracing.
    pub log: bool,
    /// Suppress the `Logout` notification on a 401 response.
    pub nologout: bool,
    /// Skip JSON decoding; the body text is returned as-is.
    pub noparse: bool,
    /// Suppress prefix concatenation when resolving the URL.
    pub nobase: bool,
    /// Bracket the call with `Start`/`Stop` notifications.
    pub progress: bool,
    /// Return the full [`ResultEnvelope`](crate::envelope::ResultEnvelope)
    /// instead of just the payload.
    pub raw: bool,
    /// Turn error envelopes into `Err`. When false, the envelope is returned
    /// as a normal value regardless of its error flag.
    pub throw: bool,
    /// Per-call URL base, overriding the configured prefix.
    pub base: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: None,
            body: None,
            headers: HeaderMap::new(),
            mode: None,
            retries: 1,
            clear: false,
            feedback: None,
            log: true,
            nologout: false,
            noparse: false,
            nobase: false,
            progress: false,
            raw: false,
            throw: true,
            base: None,
        }
    }
}

impl RequestOptions {
    /// Options for a GET request.
    pub fn get() -> Self {
        Self {
            method: Some(Method::GET),
            ..Self::default()
        }
    }

    /// Options for a POST request with a JSON body.
    pub fn post(body: Value) -> Self {
        Self {
            method: Some(Method::POST),
            body: Some(body),
            ..Self::default()
        }
    }

    /// Whether feedback notifications are suppressed for this call.
    pub(crate) fn feedback_suppressed(&self) -> bool {
        self.feedback == Some(false)
    }
}
