//! The transport seam: one HTTP attempt in, one response (or failure) out.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Method};
use serde_json::Value;
use std::time::Duration;

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("{0}")]
    Failed(String),
}

/// What one transport attempt sees.
///
/// `mode` and `credentials` are hints for browser-style transports; the
/// reqwest transport ignores them.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// JSON body, when present.
    pub body: Option<Value>,
    /// Transport mode hint.
    pub mode: String,
    /// Credentials hint.
    pub credentials: String,
}

/// One in-flight response: status and headers up front, body read once.
#[async_trait]
pub trait TransportResponse: Send {
    /// HTTP status code.
    fn status(&self) -> u16;

    /// Look up a response header.
    fn header(&self, name: &str) -> Option<String>;

    /// Response headers.
    fn headers(&self) -> &HeaderMap;

    /// Read the body as text. Consumes the response.
    async fn text(self: Box<Self>) -> Result<String, TransportError>;
}

/// The underlying single-request HTTP mechanism this crate orchestrates.
///
/// An `Err` (or an implementation that yields no response) is a transport
/// failure and is eligible for retry; an `Ok` with any status is final.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request.
    async fn attempt(
        &self,
        url: &str,
        request: &RequestDescriptor,
    ) -> Result<Box<dyn TransportResponse>, TransportError>;
}

/// Transport-level client configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("courier/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 10,
        }
    }
}

/// Production transport backed by reqwest.
///
/// No request-level timeout is set on the client: the deadline race owns
/// timing, and a second timer would race it with a different error shape.
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Create a transport with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(TransportConfig::default())
    }

    /// Create a transport with custom configuration.
    pub fn with_config(config: TransportConfig) -> Result<Self, TransportError> {
        let inner = ClientBuilder::new()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(TransportError::ClientBuild)?;
        Ok(Self { inner })
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn attempt(
        &self,
        url: &str,
        request: &RequestDescriptor,
    ) -> Result<Box<dyn TransportResponse>, TransportError> {
        tracing::debug!(%url, method = %request.method, "issuing request");
        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(TransportError::Request)?;
        tracing::debug!(%url, status = response.status().as_u16(), "response received");
        Ok(Box::new(ReqwestResponse { inner: response }))
    }
}

struct ReqwestResponse {
    inner: reqwest::Response,
}

#[async_trait]
impl TransportResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.inner
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    async fn text(self: Box<Self>) -> Result<String, TransportError> {
        self.inner.text().await.map_err(TransportError::Read)
    }
}
