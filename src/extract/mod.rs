//! Extraction module for comment markup and embedded tokens
//!
//! Everything here is pure and I/O-free: functions take raw HTML (a full
//! page or an AJAX fragment) and return structured data or an explicit
//! extraction error.
//!
//! # Components
//!
//! - `comments`: comment records and reply-group ids from rendered markup
//! - `tokens`: opaque continuation/session tokens embedded near marker keys

mod comments;
mod tokens;

pub use comments::{extract_comments, extract_reply_group_ids, CommentRecord};
pub use tokens::{find_token, PAGE_TOKEN_KEY, PAGE_TOKEN_OFFSET, SESSION_TOKEN_KEY, SESSION_TOKEN_OFFSET};

use thiserror::Error;

/// Errors raised while extracting data from platform markup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A comment item is missing one of its required sub-nodes.
    ///
    /// Surfaced rather than skipped: a missing text or time node means the
    /// platform changed its markup contract, which callers need to know.
    #[error("comment item {index} is missing its {field}")]
    MalformedItem { index: usize, field: &'static str },

    /// A required token marker key was not found in the page
    #[error("token marker {key:?} not found in page")]
    TokenNotFound { key: String },

    /// A CSS selector failed to parse (compile-time constant gone wrong)
    #[error("invalid selector: {0}")]
    Selector(String),
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
