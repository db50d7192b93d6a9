//! Canonical request outcome types.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status substituted when no real response was ever obtained (timeout or
/// exhausted retries).
pub const STATUS_NO_RESPONSE: u16 = 444;

/// Severity attached to a classified outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

/// Status and headers of the real transport response, captured before the
/// body is consumed.
#[derive(Debug, Clone)]
pub struct ResponseParts {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
}

/// The normalized, caller-facing representation of one request's outcome.
///
/// Exactly one envelope is produced per call. `error` is true iff the
/// resolved status is neither 200 nor the 401 silent path, or no response
/// existed at all, or the body itself reported an error.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    /// The resolved URL this call targeted.
    pub url: String,
    /// Resolved status; [`STATUS_NO_RESPONSE`] when no response existed.
    pub status: u16,
    /// Parsed JSON, server-envelope `data` field, or raw body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Whether the outcome is classified as an error.
    pub error: bool,
    /// User-facing message for error outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Severity of the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Schema metadata forwarded from a server-envelope body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// Count metadata forwarded from a server-envelope body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// The raw transport response, when one existed.
    #[serde(skip)]
    pub response: Option<ResponseParts>,
}

impl ResultEnvelope {
    pub(crate) fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
            data: None,
            error: false,
            message: None,
            severity: None,
            schema: None,
            count: None,
            response: None,
        }
    }

    /// Envelope for a deadline that fired before any response arrived.
    pub(crate) fn timed_out(url: impl Into<String>) -> Self {
        Self {
            error: true,
            message: Some("Request timed out, please retry".to_string()),
            severity: Some(Severity::Error),
            ..Self::new(url, STATUS_NO_RESPONSE)
        }
    }
}

/// The non-raw return shape: the payload plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// The data value, when the outcome carried one.
    pub data: Option<Value>,
    /// Schema metadata, when the body supplied it.
    pub schema: Option<Value>,
    /// Count metadata, when the body supplied it.
    pub count: Option<u64>,
}

impl From<&ResultEnvelope> for Payload {
    fn from(envelope: &ResultEnvelope) -> Self {
        Self {
            data: envelope.data.clone(),
            schema: envelope.schema.clone(),
            count: envelope.count,
        }
    }
}

/// What a successful call returns: the payload, or the full envelope when
/// the `raw` option was set.
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// The payload alone (`raw: false`, the default).
    Data(Payload),
    /// The full envelope (`raw: true`).
    Raw(ResultEnvelope),
}

impl FetchResult {
    /// The data value, whichever shape this is.
    pub fn data(&self) -> Option<&Value> {
        match self {
            FetchResult::Data(payload) => payload.data.as_ref(),
            FetchResult::Raw(envelope) => envelope.data.as_ref(),
        }
    }

    /// Consume into the data value.
    pub fn into_data(self) -> Option<Value> {
        match self {
            FetchResult::Data(payload) => payload.data,
            FetchResult::Raw(envelope) => envelope.data,
        }
    }

    /// The full envelope, if this is a raw result.
    pub fn raw(&self) -> Option<&ResultEnvelope> {
        match self {
            FetchResult::Raw(envelope) => Some(envelope),
            FetchResult::Data(_) => None,
        }
    }

    /// Count metadata, whichever shape this is.
    pub fn count(&self) -> Option<u64> {
        match self {
            FetchResult::Data(payload) => payload.count,
            FetchResult::Raw(envelope) => envelope.count,
        }
    }

    /// Schema metadata, whichever shape this is.
    pub fn schema(&self) -> Option<&Value> {
        match self {
            FetchResult::Data(payload) => payload.schema.as_ref(),
            FetchResult::Raw(envelope) => envelope.schema.as_ref(),
        }
    }
}
