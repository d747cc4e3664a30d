//! Collection run configuration

use std::time::Duration;

use starlab_core::HttpConfig;

use crate::api::DEFAULT_API_URL;
use crate::paginator::PaginatorConfig;

/// GitHub caps search page size at 100
pub const MAX_PAGE_SIZE: usize = 100;

/// Runtime configuration for one collection run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// GitHub token; required for live collection
    pub token: Option<String>,
    /// Only repositories with more stars than this are searched
    pub min_stars: u64,
    pub page_size: usize,
    /// Records to collect
    pub target: usize,
    pub request_delay: Duration,
    pub http: HttpConfig,
    /// Keep a truncated dataset when the run fails
    pub allow_partial: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            min_stars: 1000,
            page_size: 10,
            target: 1000,
            request_delay: Duration::from_millis(500),
            http: HttpConfig::default(),
            allow_partial: false,
        }
    }
}

impl Config {
    /// Reject values that would make the run meaningless before any request is made.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_PAGE_SIZE).contains(&self.page_size),
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
            self.page_size
        );
        anyhow::ensure!(self.target >= 1, "target record count must be positive");
        anyhow::ensure!(self.min_stars >= 1, "star threshold must be positive");
        anyhow::ensure!(self.http.max_attempts >= 1, "max attempts must be at least 1");
        Ok(())
    }

    pub fn paginator_config(&self) -> PaginatorConfig {
        PaginatorConfig {
            page_size: self.page_size,
            target: self.target,
            request_delay: self.request_delay,
            retry: self.http.retry_policy(),
            keep_partial: self.allow_partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.target, 1000);
        assert_eq!(config.min_stars, 1000);
    }

    #[test]
    fn rejects_oversized_page() {
        let config = Config {
            page_size: 101,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_target() {
        let config = Config {
            target: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn paginator_config_carries_retry_policy() {
        let config = Config {
            allow_partial: true,
            ..Config::default()
        };
        let pc = config.paginator_config();
        assert!(pc.keep_partial);
        assert_eq!(pc.retry.max_attempts, 3);
    }
}
