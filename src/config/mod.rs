//! Crawl configuration
//!
//! All tuning knobs for one crawl invocation, populated from CLI flags.
//! Tests override the delays and point `base_url` at a mock server.

use std::time::Duration;

/// Default platform origin for all request URLs
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Configuration for a single crawl invocation
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Origin the URL templates are rendered against (overridable for tests)
    pub base_url: String,

    /// Request comments ordered by time instead of relevance
    pub order_by_time: bool,

    /// Pause between successive successful requests
    pub request_delay: Duration,

    /// Pause before retrying (pagination) or skipping (replies) on HTTP 503
    pub rate_limit_backoff: Duration,

    /// Total per-request timeout for the HTTP client
    pub request_timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            order_by_time: false,
            request_delay: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}
