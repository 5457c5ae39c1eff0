//! Runtime tunables for the invocation core.

use std::time::Duration;

/// Configuration for calls that await an in-process reply.
#[derive(Debug, Clone)]
pub struct CallConfig {
    /// How long a caller waits on a reply rendezvous before giving up.
    pub reply_timeout: Duration,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(30),
        }
    }
}

impl CallConfig {
    /// Create a config with a custom reply timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            reply_timeout: timeout,
        }
    }
}
