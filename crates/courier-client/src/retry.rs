//! The retry driver: bounded re-attempts on transport failure.

use crate::race::RequestState;
use crate::transport::{RequestDescriptor, Transport, TransportResponse};
use std::sync::Arc;

/// Attempt the transport until it yields a response, the retry budget is
/// spent, or the deadline has fired.
///
/// Any response, whatever its status, ends the loop: retries are reserved
/// for communication failure, not application error statuses. On persistent
/// failure the total attempt count is `1 + retries`.
pub(crate) async fn drive(
    transport: Arc<dyn Transport>,
    state: RequestState,
    request: RequestDescriptor,
    retries: u32,
) -> Option<Box<dyn TransportResponse>> {
    let mut remaining = retries;
    loop {
        match transport.attempt(&state.url, &request).await {
            Ok(response) => return Some(response),
            Err(err) => {
                if state.deadline_fired() {
                    // The timer already supplied the outcome; a late result
                    // here would never be observed.
                    tracing::debug!(url = %state.url, error = %err, "deadline fired, abandoning attempt");
                    return None;
                }
                if remaining == 0 {
                    tracing::warn!(url = %state.url, error = %err, "retries exhausted without a response");
                    return None;
                }
                remaining -= 1;
                tracing::debug!(url = %state.url, remaining, error = %err, "retrying after transport failure");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{TransportError, TransportResponse};
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct TextResponse {
        status: u16,
        headers: HeaderMap,
        body: String,
    }

    #[async_trait]
    impl TransportResponse for TextResponse {
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

    /// Fails `failures` times, then answers with status 200.
    struct FlakyTransport {
        failures: u32,
        attempts: AtomicU32,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn attempt(
            &self,
            _url: &str,
            _request: &RequestDescriptor,
        ) -> Result<Box<dyn TransportResponse>, TransportError> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(TransportError::Failed("connection refused".to_string()))
            } else {
                Ok(Box::new(TextResponse {
                    status: 200,
                    headers: HeaderMap::new(),
                    body: String::new(),
                }))
            }
        }
    }

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor {
            method: reqwest::Method::GET,
            headers: HeaderMap::new(),
            body: None,
            mode: "cors".to_string(),
            credentials: "include".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let transport = Arc::new(FlakyTransport {
            failures: 2,
            attempts: AtomicU32::new(0),
        });
        let state = RequestState::new("/x");
        let result = drive(transport.clone(), state, descriptor(), 2).await;
        assert!(result.is_some());
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_yield_nothing() {
        let transport = Arc::new(FlakyTransport {
            failures: u32::MAX,
            attempts: AtomicU32::new(0),
        });
        let state = RequestState::new("/x");
        let result = drive(transport.clone(), state, descriptor(), 2).await;
        assert!(result.is_none());
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_200_status_is_not_retried() {
        struct ServerError {
            attempts: AtomicU32,
        }

        #[async_trait]
        impl Transport for ServerError {
            async fn attempt(
                &self,
                _url: &str,
                _request: &RequestDescriptor,
            ) -> Result<Box<dyn TransportResponse>, TransportError> {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(TextResponse {
                    status: 500,
                    headers: HeaderMap::new(),
                    body: String::new(),
                }))
            }
        }

        let transport = Arc::new(ServerError {
            attempts: AtomicU32::new(0),
        });
        let state = RequestState::new("/x");
        let result = drive(transport.clone(), state, descriptor(), 5).await;
        assert_eq!(result.map(|r| r.status()), Some(500));
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_deadline_abandons_remaining_retries() {
        let transport = Arc::new(FlakyTransport {
            failures: u32::MAX,
            attempts: AtomicU32::new(0),
        });
        let state = RequestState::new("/x");
        state.mark_deadline_fired();
        let result = drive(transport.clone(), state, descriptor(), 5).await;
        assert!(result.is_none());
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 1);
    }
}
