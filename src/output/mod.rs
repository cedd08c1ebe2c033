//! Output module for streaming comment records
//!
//! The crawler is I/O-agnostic beyond its HTTP client: it pushes each
//! deduplicated record into a [`CommentSink`] as it is discovered, so the
//! consumer can persist records incrementally instead of buffering the whole
//! crawl. A sink error aborts the crawl before any further request.

mod json_lines;
mod traits;

pub use json_lines::JsonLinesSink;
pub use traits::{CommentSink, OutputError, OutputResult, ProgressFn};
