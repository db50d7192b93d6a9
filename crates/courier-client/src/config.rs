//! Client configuration.

use std::time::Duration;

/// Process-wide request defaults, passed explicitly to the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deadline configuration.
    pub timeouts: Timeouts,
    /// Prefix concatenated onto relative URLs.
    pub prefix: String,
}

/// Deadline configuration.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Hard wall-clock deadline for one call, retries included.
    pub http: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeouts: Timeouts {
                http: Duration::from_secs(30),
            },
            prefix: String::new(),
        }
    }
}
