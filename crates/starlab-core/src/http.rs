//! HTTP client construction and the shared runtime.
//!
//! Requests are async reqwest underneath but the pipeline is strictly sequential,
//! so callers block on [`SHARED_RUNTIME`] and see a plain sync interface.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::CollectError;
use crate::retry::RetryPolicy;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent sent with every request (GitHub rejects requests without one)
pub const USER_AGENT: &str = concat!("starlab/", env!("CARGO_PKG_VERSION"));

/// Transport settings shared by every request of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// Total attempts for transient failures
    pub max_attempts: u32,
    /// First backoff delay; doubles on each retry
    pub backoff_base: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl HttpConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.backoff_base,
        }
    }

    /// Build a client with this config's timeouts.
    pub fn build_client(&self) -> Result<reqwest::Client, CollectError> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| CollectError::transient(format!("cannot build HTTP client: {e}")))
    }
}

/// Shared tokio runtime for HTTP operations.
///
/// One worker is enough: at most one request is in flight at a time.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_config() {
        let config = HttpConfig::default();
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn user_agent_has_version() {
        assert!(USER_AGENT.starts_with("starlab/"));
    }

    #[test]
    fn build_client_succeeds() {
        assert!(HttpConfig::default().build_client().is_ok());
    }
}
