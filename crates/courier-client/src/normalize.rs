//! Response normalization: raw outcomes into canonical envelopes.

use crate::envelope::{ResponseParts, ResultEnvelope, Severity, STATUS_NO_RESPONSE};
use crate::notify::{self, Notification, Notifier};
use crate::options::RequestOptions;
use crate::race::RawOutcome;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Message attached to any non-200, non-401 outcome that did not supply its
/// own classification.
pub const MSG_COMMUNICATION_FAILED: &str = "Could Not Communicate With Server";

/// Caller-extensible JSON decode hook.
pub type Decoder = Arc<dyn Fn(&str) -> Result<Value, serde_json::Error> + Send + Sync>;

/// The default decode hook: plain `serde_json`.
pub fn default_decoder() -> Decoder {
    Arc::new(|text| serde_json::from_str(text))
}

/// Envelope fields a server may carry inside a JSON body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BodyFields {
    data: Option<Value>,
    error: Option<bool>,
    message: Option<String>,
    severity: Option<Severity>,
    schema: Option<Value>,
    count: Option<u64>,
}

/// Turn one raw outcome into the canonical envelope, emitting `Logout` and
/// `Feedback` notifications where the classification rules call for them.
pub(crate) async fn normalize(
    outcome: RawOutcome,
    url: &str,
    options: &RequestOptions,
    notifier: &dyn Notifier,
    decoder: &Decoder,
) -> ResultEnvelope {
    let mut envelope = match outcome {
        RawOutcome::TimedOut => ResultEnvelope::timed_out(url),
        RawOutcome::Absent => ResultEnvelope::new(url, STATUS_NO_RESPONSE),
        RawOutcome::Response(response) => {
            let parts = ResponseParts {
                status: response.status(),
                headers: response.headers().clone(),
            };
            let content_type = response.header("content-type");
            let mut envelope = ResultEnvelope::new(url, parts.status);

            match response.text().await {
                Ok(text) if !text.is_empty() => {
                    let json_body = content_type
                        .as_deref()
                        .map(|ct| ct.starts_with("application/json"))
                        .unwrap_or(false);
                    if json_body && !options.noparse {
                        match decoder(&text) {
                            Ok(value) => apply_body(&mut envelope, value),
                            Err(err) => {
                                // Recoverable degradation: the call goes on
                                // with no data.
                                tracing::warn!(%url, error = %err, "malformed JSON body, leaving data unset");
                            }
                        }
                    } else {
                        envelope.data = Some(Value::String(text));
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%url, error = %err, "failed to read response body");
                }
            }

            envelope.response = Some(parts);
            envelope
        }
    };

    if envelope.status == 401 {
        // 401 is its own channel, not a generic failure.
        if !options.nologout {
            notify::emit(notifier, Notification::Logout(envelope.clone()));
        }
    } else if envelope.status != 200 && !envelope.error {
        envelope.error = true;
        envelope.message = Some(MSG_COMMUNICATION_FAILED.to_string());
        envelope.severity = Some(Severity::Error);
    }

    if !options.feedback_suppressed() && (envelope.status != 200 || envelope.error) {
        notify::emit(notifier, Notification::Feedback(envelope.clone()));
    }

    if envelope.error && options.log && envelope.status != 401 {
        tracing::error!(
            url = %envelope.url,
            status = envelope.status,
            message = envelope.message.as_deref().unwrap_or(""),
            "request failed"
        );
    }

    envelope
}

/// Fold a decoded body into the envelope. The whole value becomes `data`;
/// a JSON-object body may override the envelope's own fields, so a server
/// envelope `{"data": …, "count": …}` surfaces its inner data and metadata.
fn apply_body(envelope: &mut ResultEnvelope, value: Value) {
    let object = value.is_object();
    envelope.data = Some(value.clone());
    if !object {
        return;
    }
    match serde_json::from_value::<BodyFields>(value) {
        Ok(fields) => {
            if fields.data.is_some() {
                envelope.data = fields.data;
            }
            if let Some(error) = fields.error {
                envelope.error = error;
            }
            if fields.message.is_some() {
                envelope.message = fields.message;
            }
            if fields.severity.is_some() {
                envelope.severity = fields.severity;
            }
            if fields.schema.is_some() {
                envelope.schema = fields.schema;
            }
            if fields.count.is_some() {
                envelope.count = fields.count;
            }
        }
        Err(err) => {
            // Shape mismatch on a recognized field; keep the body as opaque data.
            tracing::debug!(error = %err, "body does not match envelope fields");
        }
    }
}
