//! HTTP mocking utilities using wiremock.

use serde::Serialize;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock HTTP server wrapper with endpoint helpers for the courier tests.
pub struct TestHttpServer {
    server: MockServer,
}

impl TestHttpServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL of the server, suitable as a client prefix.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Full URL for a path on this server.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.server.uri(), endpoint)
    }

    /// Access the underlying wiremock server.
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Mount a GET endpoint answering 200 with a JSON body.
    pub async fn get_json<T: Serialize>(&self, endpoint: &str, response: &T) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Mount a POST endpoint answering 200 with a JSON body.
    pub async fn post_json<T: Serialize>(&self, endpoint: &str, response: &T) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Mount an endpoint answering an arbitrary status with a JSON body.
    pub async fn status_json<T: Serialize>(&self, endpoint: &str, status: u16, response: &T) {
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Mount an endpoint answering with a raw body and explicit content type.
    pub async fn raw(&self, endpoint: &str, status: u16, content_type: &str, body: &str) {
        // set_body_string would force text/plain; set_body_raw keeps the
        // declared content type.
        Mock::given(path(endpoint))
            .respond_with(
                ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), content_type),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount an endpoint that answers only after a pause.
    pub async fn with_latency<T: Serialize>(&self, endpoint: &str, response: &T, latency: Duration) {
        Mock::given(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(response)
                    .set_delay(latency),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a sequence of one-shot responses for an endpoint, in order.
    pub async fn sequence(&self, endpoint: &str, responses: Vec<ResponseTemplate>) {
        // Lower priority number wins in wiremock, so earlier responses get
        // lower numbers.
        for (i, response) in responses.into_iter().enumerate() {
            Mock::given(path(endpoint))
                .respond_with(response)
                .up_to_n_times(1)
                .with_priority(i as u8 + 1)
                .mount(&self.server)
                .await;
        }
    }

    /// Assert the number of requests received for a path.
    pub async fn verify_received(&self, endpoint: &str, times: u64) {
        let received = self.server.received_requests().await.unwrap_or_default();
        let count = received
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count() as u64;
        assert_eq!(
            count, times,
            "Expected {} requests to {}, got {}",
            times, endpoint, count
        );
    }

    /// All requests the server has seen.
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
