//! Crawler module for retrieving the comment tree
//!
//! This module contains the core crawl logic, including:
//! - The cookie-persisting HTTP session client
//! - The platform's URL templates and form-field contract
//! - The three-phase crawl state machine (initial page, token-driven
//!   pagination, reply expansion)

mod client;
mod coordinator;
mod urls;

pub use client::{PageResponse, SessionClient};
pub use coordinator::{Crawler, Phase};
pub use urls::{comments_page_url, load_comments_more_url, load_comments_order_url, load_replies_url};

use crate::config::CrawlConfig;
use crate::output::CommentSink;
use crate::Result;

/// Runs a complete crawl for one video
///
/// Builds a session client, streams every deduplicated comment record into
/// `sink`, and returns the number of records written.
///
/// # Example
///
/// ```no_run
/// use tube_comments::{crawl, CrawlConfig, JsonLinesSink};
///
/// # async fn example() -> tube_comments::Result<()> {
/// let mut sink = JsonLinesSink::new(Vec::new());
/// let count = crawl("dQw4w9WgXcQ", CrawlConfig::default(), &mut sink).await?;
/// println!("downloaded {} comments", count);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    video_id: &str,
    config: CrawlConfig,
    sink: &mut dyn CommentSink,
) -> Result<u64> {
    let mut crawler = Crawler::new(video_id, config)?;
    crawler.run(sink).await
}
