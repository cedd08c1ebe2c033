//! Output sink trait and error types

use crate::extract::CommentRecord;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Progress callback invoked with the running record count after each write
pub type ProgressFn = Box<dyn FnMut(u64)>;

/// Trait for consumers of the crawl's record stream
///
/// Implementations receive records in discovery order, already deduplicated
/// by the crawler. Returning an error from `write` aborts the crawl with no
/// further requests.
pub trait CommentSink {
    /// Appends one record to the output
    fn write(&mut self, record: &CommentRecord) -> OutputResult<()>;

    /// Flushes any buffered output
    fn flush(&mut self) -> OutputResult<()>;

    /// Number of records written so far
    fn count(&self) -> u64;
}
