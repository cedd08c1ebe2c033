//! tube-comments: download the full comment tree of a video without the platform API
//!
//! This crate reconstructs the platform's "load more" behavior by scraping
//! server-rendered markup and replaying its internal AJAX contract (page
//! tokens, session tokens, ordering modes). Comments are streamed to an
//! output sink as they are discovered, deduplicated across all phases.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;

use thiserror::Error;

/// Main error type for crawl operations
///
/// A crawl aborts on the first fatal error. HTTP 503 is the only recoverable
/// condition and is handled inside the crawler (backoff-and-retry during
/// pagination, backoff-and-skip during reply expansion), so it never surfaces
/// here.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Non-success, non-503 HTTP status from the platform
    #[error("HTTP {status} during {phase} for video {video_id} (page token: {page_token:?})")]
    Transport {
        phase: crawler::Phase,
        video_id: String,
        status: u16,
        page_token: Option<String>,
    },

    /// Connection-level failure (refused, timeout, TLS, ...)
    #[error("request failed during {phase} for video {video_id}: {source}")]
    Network {
        phase: crawler::Phase,
        video_id: String,
        source: reqwest::Error,
    },

    /// Response body is not the expected continuation envelope
    #[error("bad envelope during {phase} for video {video_id}: {reason} (page token: {page_token:?})")]
    Protocol {
        phase: crawler::Phase,
        video_id: String,
        reason: String,
        page_token: Option<String>,
    },

    /// Markup or token extraction failure
    #[error("{source} during {phase} for video {video_id} (page token: {page_token:?})")]
    Extract {
        phase: crawler::Phase,
        video_id: String,
        page_token: Option<String>,
        source: extract::ExtractError,
    },

    /// Output sink failure
    #[error("output failed during {phase} for video {video_id}: {source}")]
    Output {
        phase: crawler::Phase,
        video_id: String,
        source: output::OutputError,
    },

    /// Failed to build the HTTP client
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The configured base URL is not a valid URL
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{crawl, Crawler, Phase, SessionClient};
pub use extract::{extract_comments, extract_reply_group_ids, find_token, CommentRecord};
pub use output::{CommentSink, JsonLinesSink};
