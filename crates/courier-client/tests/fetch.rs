//! End-to-end orchestration behavior over wiremock and scripted transports.

use courier_client::{
    Client, ClientConfig, FetchError, FetchResult, RequestOptions, Timeouts,
    MSG_COMMUNICATION_FAILED, STATUS_NO_RESPONSE,
};
use courier_test_harness::{
    FailingNotifier, RecordingNotifier, ScriptedResponse, ScriptedTransport, Step, TestHttpServer,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::ResponseTemplate;

fn short_deadline() -> ClientConfig {
    ClientConfig {
        timeouts: Timeouts {
            http: Duration::from_millis(80),
        },
        prefix: String::new(),
    }
}

#[tokio::test]
async fn test_get_returns_unwrapped_data_with_count() {
    let server = TestHttpServer::start().await;
    server
        .get_json("/api/items", &json!({"data": [1, 2, 3], "count": 3}))
        .await;
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::new()
        .unwrap()
        .with_config(ClientConfig {
            prefix: server.url(),
            ..Default::default()
        })
        .with_notifier(notifier.clone());

    let result = client.get("/api/items").await.unwrap();
    assert_eq!(result.data(), Some(&json!([1, 2, 3])));
    assert_eq!(result.count(), Some(3));
    assert!(notifier.is_empty(), "success must emit no notifications");
    server.verify_received("/api/items", 1).await;
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = TestHttpServer::start().await;
    server
        .post_json("/api/save", &json!({"data": {"saved": true}}))
        .await;
    let client = Client::new().unwrap().with_config(ClientConfig {
        prefix: server.url(),
        ..Default::default()
    });

    let result = client.post("/api/save", json!({"name": "x"})).await.unwrap();
    assert_eq!(result.data(), Some(&json!({"saved": true})));

    let requests = server.received_requests().await;
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body, json!({"name": "x"}));
}

#[tokio::test]
async fn test_deadline_elapsing_yields_timeout_envelope() {
    let server = TestHttpServer::start().await;
    server
        .with_latency("/api/slow", &json!({"data": 1}), Duration::from_secs(2))
        .await;
    let client = Client::new().unwrap().with_config(ClientConfig {
        prefix: server.url(),
        timeouts: Timeouts {
            http: Duration::from_millis(80),
        },
    });

    let err = client.get("/api/slow").await.unwrap_err();
    assert_eq!(err.to_string(), "Request timed out, please retry");
    let envelope = err.envelope().unwrap();
    assert_eq!(envelope.status, STATUS_NO_RESPONSE);
    assert!(envelope.error);
}

#[tokio::test]
async fn test_transient_failures_are_retried_until_success() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        Step::Fail("connection refused".to_string()),
        Step::Fail("connection refused".to_string()),
        Step::Respond(ScriptedResponse::json(200, r#"{"data":{"ok":true}}"#)),
    ]));
    let client = Client::with_transport(transport.clone());

    let options = RequestOptions {
        retries: 2,
        ..Default::default()
    };
    let result = client.post_with("/api/save", json!({}), options).await.unwrap();
    assert_eq!(result.data(), Some(&json!({"ok": true})));
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_yield_error_envelope() {
    let transport = Arc::new(ScriptedTransport::always_failing("connection refused"));
    let client = Client::with_transport(transport.clone());

    let options = RequestOptions {
        retries: 2,
        ..Default::default()
    };
    let err = client.fetch("/api/items", options).await.unwrap_err();
    let envelope = err.envelope().unwrap();
    assert_eq!(envelope.status, STATUS_NO_RESPONSE);
    assert!(envelope.error);
    assert_eq!(envelope.message.as_deref(), Some(MSG_COMMUNICATION_FAILED));
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test]
async fn test_timeout_wins_regardless_of_remaining_retries() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Delay(
        Duration::from_secs(2),
        ScriptedResponse::json(200, r#"{"data":1}"#),
    )]));
    let client = Client::with_transport(transport.clone()).with_config(short_deadline());

    let options = RequestOptions {
        retries: 5,
        ..Default::default()
    };
    let err = client.fetch("/api/slow", options).await.unwrap_err();
    assert_eq!(err.to_string(), "Request timed out, please retry");
    // The one in-flight attempt is discarded, never re-driven.
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn test_unauthorized_emits_logout_and_is_not_an_error() {
    let server = TestHttpServer::start().await;
    server.status_json("/api/me", 401, &json!({})).await;
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::new()
        .unwrap()
        .with_config(ClientConfig {
            prefix: server.url(),
            ..Default::default()
        })
        .with_notifier(notifier.clone());

    let result = client.get("/api/me").await;
    assert!(result.is_ok(), "401 alone must not raise");
    assert!(notifier.saw("logout"));
    let envelope = notifier.envelope_for("logout").unwrap();
    assert_eq!(envelope.status, 401);
    assert!(!envelope.error);
}

#[tokio::test]
async fn test_nologout_suppresses_logout_notification() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::json(401, "{}"),
    )]));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::with_transport(transport).with_notifier(notifier.clone());

    let options = RequestOptions {
        nologout: true,
        ..RequestOptions::get()
    };
    client.fetch("/api/me", options).await.unwrap();
    assert!(!notifier.saw("logout"));
}

#[tokio::test]
async fn test_thrown_401_emits_login() {
    // A 401 whose body says error: the throw path adds a login notification.
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::json(401, r#"{"error":true,"message":"session expired"}"#),
    )]));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::with_transport(transport).with_notifier(notifier.clone());

    let err = client.get("/api/me").await.unwrap_err();
    assert_eq!(err.to_string(), "session expired");
    assert!(notifier.saw("logout"));
    assert!(notifier.saw("login"));
}

#[tokio::test]
async fn test_throw_false_returns_error_envelope_instead_of_raising() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::text(500, "oops"),
    )]));
    let client = Client::with_transport(transport);

    let options = RequestOptions {
        throw: false,
        raw: true,
        ..RequestOptions::get()
    };
    let result = client.fetch("/api/items", options).await.unwrap();
    let envelope = result.raw().unwrap();
    assert!(envelope.error);
    assert_eq!(envelope.status, 500);
    assert_eq!(envelope.message.as_deref(), Some(MSG_COMMUNICATION_FAILED));
}

#[tokio::test]
async fn test_default_throw_raises_with_envelope_message() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::text(503, ""),
    )]));
    let client = Client::with_transport(transport);

    match client.get("/api/items").await {
        Err(FetchError::Request { message, envelope }) => {
            assert_eq!(message, envelope.message.clone().unwrap());
            assert_eq!(envelope.status, 503);
        }
        other => panic!("expected a request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_raw_envelope_data_matches_default_return() {
    let body = r#"{"data":{"id":7},"count":1}"#;
    let script = || {
        Arc::new(ScriptedTransport::new(vec![Step::Respond(
            ScriptedResponse::json(200, body),
        )]))
    };

    let plain = Client::with_transport(script())
        .get("/api/item")
        .await
        .unwrap();
    let raw = Client::with_transport(script())
        .get_with(
            "/api/item",
            RequestOptions {
                raw: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(raw.data(), plain.data());
    assert_eq!(raw.count(), plain.count());
    assert!(matches!(plain, FetchResult::Data(_)));
    assert!(matches!(raw, FetchResult::Raw(_)));
}

#[tokio::test]
async fn test_feedback_false_never_fires_feedback() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::text(500, ""),
    )]));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::with_transport(transport).with_notifier(notifier.clone());

    let options = RequestOptions {
        feedback: Some(false),
        throw: false,
        ..RequestOptions::get()
    };
    client.fetch("/api/items", options).await.unwrap();
    assert!(!notifier.saw("feedback"));
}

#[tokio::test]
async fn test_feedback_fires_on_error_by_default() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::text(500, ""),
    )]));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::with_transport(transport).with_notifier(notifier.clone());

    let options = RequestOptions {
        throw: false,
        ..RequestOptions::get()
    };
    client.fetch("/api/items", options).await.unwrap();
    let envelope = notifier.envelope_for("feedback").unwrap();
    assert_eq!(envelope.status, 500);
    assert!(envelope.error);
}

#[tokio::test]
async fn test_lifecycle_notifications_fire_in_order() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::text(500, ""),
    )]));
    let notifier = Arc::new(RecordingNotifier::new());
    let client = Client::with_transport(transport).with_notifier(notifier.clone());

    let options = RequestOptions {
        clear: true,
        progress: true,
        throw: false,
        ..RequestOptions::get()
    };
    client.fetch("/api/items", options).await.unwrap();
    assert_eq!(notifier.reasons(), vec!["clear", "start", "feedback", "stop"]);
}

#[tokio::test]
async fn test_failing_notifier_does_not_affect_the_call() {
    let transport = Arc::new(ScriptedTransport::new(vec![Step::Respond(
        ScriptedResponse::json(200, r#"{"data":1}"#),
    )]));
    let client = Client::with_transport(transport).with_notifier(Arc::new(FailingNotifier));

    let options = RequestOptions {
        clear: true,
        progress: true,
        ..RequestOptions::get()
    };
    let result = client.fetch("/api/items", options).await.unwrap();
    assert_eq!(result.data(), Some(&json!(1)));
}

#[tokio::test]
async fn test_noparse_returns_raw_body_text() {
    let server = TestHttpServer::start().await;
    server
        .raw("/api/blob", 200, "application/json", r#"{"data":1}"#)
        .await;
    let client = Client::new().unwrap().with_config(ClientConfig {
        prefix: server.url(),
        ..Default::default()
    });

    let options = RequestOptions {
        noparse: true,
        ..RequestOptions::get()
    };
    let result = client.fetch("/api/blob", options).await.unwrap();
    assert_eq!(result.data(), Some(&json!(r#"{"data":1}"#)));
}

#[tokio::test]
async fn test_malformed_json_body_degrades_gracefully() {
    let server = TestHttpServer::start().await;
    server.raw("/api/broken", 200, "application/json", "{oops").await;
    let client = Client::new().unwrap().with_config(ClientConfig {
        prefix: server.url(),
        ..Default::default()
    });

    let result = client.get("/api/broken").await.unwrap();
    assert!(result.data().is_none());
}

#[tokio::test]
async fn test_sequenced_responses_feed_independent_calls() {
    let server = TestHttpServer::start().await;
    server
        .sequence(
            "/api/flaky",
            vec![
                ResponseTemplate::new(500),
                ResponseTemplate::new(200).set_body_json(json!({"data": "recovered"})),
            ],
        )
        .await;
    let client = Client::new().unwrap().with_config(ClientConfig {
        prefix: server.url(),
        ..Default::default()
    });

    // A 500 is an application outcome, not a transport failure: the first
    // call classifies it rather than retrying.
    let first = client
        .get_with(
            "/api/flaky",
            RequestOptions {
                throw: false,
                raw: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(first.raw().unwrap().error);

    let second = client.get("/api/flaky").await.unwrap();
    assert_eq!(second.data(), Some(&json!("recovered")));
    server.verify_received("/api/flaky", 2).await;
}
