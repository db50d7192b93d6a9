//! The request facade.

use crate::config::ClientConfig;
use crate::envelope::{FetchResult, Payload};
use crate::error::FetchError;
use crate::normalize::{self, Decoder};
use crate::notify::{self, Notification, Notifier, NoopNotifier};
use crate::options::RequestOptions;
use crate::race::{self, RequestState};
use crate::transport::{ReqwestTransport, RequestDescriptor, Transport, TransportError};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// The orchestrating client: deadline, bounded retry, normalization, and
/// lifecycle notifications over a [`Transport`].
pub struct Client {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    config: ClientConfig,
    decoder: Decoder,
}

impl Client {
    /// Create a client over the production reqwest transport, with default
    /// configuration and no notification sink.
    pub fn new() -> Result<Self, TransportError> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            notifier: Arc::new(NoopNotifier),
            config: ClientConfig::default(),
            decoder: normalize::default_decoder(),
        }
    }

    /// Set the client configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the JSON decode hook.
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// GET a URL with default options.
    pub async fn get(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.fetch(url, RequestOptions::get()).await
    }

    /// GET a URL with explicit options; the method is forced to GET.
    pub async fn get_with(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<FetchResult, FetchError> {
        self.fetch(
            url,
            RequestOptions {
                method: Some(Method::GET),
                ..options
            },
        )
        .await
    }

    /// POST a JSON body with default options.
    pub async fn post(&self, url: &str, body: Value) -> Result<FetchResult, FetchError> {
        self.fetch(url, RequestOptions::post(body)).await
    }

    /// POST a JSON body with explicit options; the method is forced to POST.
    pub async fn post_with(
        &self,
        url: &str,
        body: Value,
        options: RequestOptions,
    ) -> Result<FetchResult, FetchError> {
        self.fetch(
            url,
            RequestOptions {
                method: Some(Method::POST),
                body: Some(body),
                ..options
            },
        )
        .await
    }

    /// Run one orchestrated request.
    ///
    /// Emits `Clear`/`Start` as requested, races the retrying transport
    /// against the configured deadline, normalizes the outcome, emits `Stop`
    /// on every exit path, and finally either returns the result or raises
    /// the classified error per the `throw` option.
    pub async fn fetch(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<FetchResult, FetchError> {
        if options.clear {
            notify::emit(self.notifier.as_ref(), Notification::Clear);
        }
        if options.progress {
            notify::emit(self.notifier.as_ref(), Notification::Start);
        }

        let resolved = self.resolve_url(url, &options);
        tracing::debug!(url = %resolved, retries = options.retries, "starting request");

        let state = RequestState::new(resolved.clone());
        let outcome = race::run(
            Arc::clone(&self.transport),
            state,
            self.descriptor(&options),
            options.retries,
            self.config.timeouts.http,
        )
        .await;

        let envelope = normalize::normalize(
            outcome,
            &resolved,
            &options,
            self.notifier.as_ref(),
            &self.decoder,
        )
        .await;

        if options.progress {
            notify::emit(self.notifier.as_ref(), Notification::Stop);
        }

        if envelope.error && options.throw {
            if envelope.status == 401 {
                notify::emit(self.notifier.as_ref(), Notification::Login);
            }
            return Err(FetchError::request(envelope));
        }

        Ok(if options.raw {
            FetchResult::Raw(envelope)
        } else {
            FetchResult::Data(Payload::from(&envelope))
        })
    }

    /// Resolve the target URL. Absolute URLs pass through; otherwise the
    /// per-call base, or the configured prefix unless suppressed, is
    /// concatenated in front.
    fn resolve_url(&self, url: &str, options: &RequestOptions) -> String {
        if url.contains("://") {
            return url.to_string();
        }
        if let Some(base) = &options.base {
            return format!("{base}{url}");
        }
        if options.nobase {
            return url.to_string();
        }
        format!("{}{}", self.config.prefix, url)
    }

    fn descriptor(&self, options: &RequestOptions) -> RequestDescriptor {
        RequestDescriptor {
            method: options.method.clone().unwrap_or(Method::POST),
            headers: options.headers.clone(),
            body: options.body.clone(),
            mode: options
                .mode
                .clone()
                .unwrap_or_else(|| "cors".to_string()),
            credentials: "include".to_string(),
        }
    }
}
