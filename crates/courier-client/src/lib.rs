//! Request orchestration over a pluggable HTTP transport.
//!
//! This crate turns a single-shot transport primitive into a predictable
//! request surface: a hard wall-clock deadline races a bounded-retry fetch,
//! the raw outcome is normalized into one canonical envelope, and lifecycle
//! notifications (clear, start, stop, feedback, logout, login) let callers
//! react to a request's life without threading that logic through every call
//! site.
//!
//! ```no_run
//! use courier_client::{Client, RequestOptions};
//!
//! # async fn example() -> Result<(), courier_client::FetchError> {
//! let client = Client::new()?;
//! let result = client.get("https://api.example.com/api/items").await?;
//! println!("{:?}", result.data());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod normalize;
pub mod notify;
pub mod options;
pub mod transport;

mod race;
mod retry;

pub use client::Client;
pub use config::{ClientConfig, Timeouts};
pub use envelope::{
    FetchResult, Payload, ResponseParts, ResultEnvelope, Severity, STATUS_NO_RESPONSE,
};
pub use error::{FetchError, MSG_CANNOT_COMPLETE};
pub use normalize::{default_decoder, Decoder, MSG_COMMUNICATION_FAILED};
pub use notify::{NoopNotifier, Notification, Notifier, NotifyError};
pub use options::RequestOptions;
pub use transport::{
    ReqwestTransport, RequestDescriptor, Transport, TransportConfig, TransportError,
    TransportResponse,
};
