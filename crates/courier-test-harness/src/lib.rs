//! Test tooling for the courier crates.
//!
//! Three fakes cover the seams the client orchestrates over: a wiremock-backed
//! HTTP server for end-to-end runs over the real transport, a scripted
//! in-memory [`Transport`](courier_client::Transport) for failure and timing
//! scenarios the network layer cannot stage, and recording/failing
//! [`Notifier`](courier_client::Notifier) implementations for asserting
//! lifecycle sequences.

pub mod notify;
pub mod server;
pub mod transport;

pub use notify::{FailingNotifier, RecordingNotifier};
pub use server::TestHttpServer;
pub use transport::{ScriptedResponse, ScriptedTransport, Step};
