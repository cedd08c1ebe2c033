//! Crawl coordinator - the three-phase comment crawl state machine
//!
//! A crawl moves through `Initial -> Paginating -> ExpandingReplies -> Done`.
//! The initial page load seeds the session token, the optional page token,
//! and the first batch of records; the pagination loop replays the "show
//! more" button until the platform stops returning a page token; the reply
//! phase then expands every collapsed thread discovered along the way.
//!
//! Requests are strictly sequential: each continuation request's parameters
//! depend on the previous response, and the platform's informal rate limits
//! leave no room for parallelism anyway.

use crate::config::CrawlConfig;
use crate::crawler::client::{PageResponse, SessionClient};
use crate::crawler::urls;
use crate::extract::{
    extract_comments, extract_reply_group_ids, find_token, CommentRecord, ExtractError,
    PAGE_TOKEN_KEY, PAGE_TOKEN_OFFSET, SESSION_TOKEN_KEY, SESSION_TOKEN_OFFSET,
};
use crate::output::{CommentSink, OutputError};
use crate::{CrawlError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use tokio::time::sleep;

/// Crawl phase, also used as error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Paginating,
    ExpandingReplies,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Initial => "initial page load",
            Phase::Paginating => "pagination",
            Phase::ExpandingReplies => "reply expansion",
            Phase::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Structured response wrapping an HTML fragment plus continuation metadata
#[derive(Debug, Deserialize)]
struct Envelope {
    html_content: Option<String>,
    page_token: Option<String>,
}

/// Parses a continuation envelope out of a raw response body
///
/// Returns the rendered fragment and the next page token (absent or empty
/// means pagination is over). The error string is a protocol-drift reason
/// for the caller to wrap with phase context.
fn parse_envelope(body: &str) -> std::result::Result<(String, Option<String>), String> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| format!("not a JSON envelope: {}", e))?;
    let html = envelope
        .html_content
        .ok_or_else(|| "missing html_content field".to_string())?;
    Ok((html, envelope.page_token))
}

/// The comment crawler
///
/// All state lives and dies within one `run` call: the HTTP session, the
/// continuation tokens, the seen-id set, and the pending reply groups.
#[derive(Debug)]
pub struct Crawler {
    client: SessionClient,
    config: CrawlConfig,
    video_id: String,

    /// Ids already written to the sink; enforces the once-per-crawl invariant
    seen: HashSet<String>,

    /// Reply groups awaiting expansion, in discovery order
    pending_replies: Vec<String>,
    known_reply_groups: HashSet<String>,

    /// Anti-forgery token, fetched once and reused on every POST
    session_token: String,
    page_token: Option<String>,
    first_iteration: bool,

    emitted: u64,
}

impl Crawler {
    /// Creates a crawler for one video
    ///
    /// Fails if the configured base URL is not parseable or the HTTP client
    /// cannot be built.
    pub fn new(video_id: impl Into<String>, config: CrawlConfig) -> Result<Self> {
        // The URL templates interpolate the base as a plain string, so a
        // malformed base has to be rejected up front.
        url::Url::parse(&config.base_url).map_err(|source| CrawlError::BaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let client = SessionClient::new(config.request_timeout)?;
        Ok(Self {
            client,
            config,
            video_id: video_id.into(),
            seen: HashSet::new(),
            pending_replies: Vec::new(),
            known_reply_groups: HashSet::new(),
            session_token: String::new(),
            page_token: None,
            first_iteration: true,
            emitted: 0,
        })
    }

    /// Runs the crawl to completion, streaming records into `sink`
    ///
    /// Returns the number of records written. Fatal errors abort the crawl;
    /// everything already written to the sink stays written.
    pub async fn run(&mut self, sink: &mut dyn CommentSink) -> Result<u64> {
        tracing::info!(
            video_id = %self.video_id,
            order_by_time = self.config.order_by_time,
            "starting comment crawl"
        );

        let mut phase = Phase::Initial;
        while phase != Phase::Done {
            phase = match phase {
                Phase::Initial => self.fetch_initial(sink).await?,
                Phase::Paginating => self.paginate(sink).await?,
                Phase::ExpandingReplies => self.expand_replies(sink).await?,
                Phase::Done => Phase::Done,
            };
        }

        sink.flush()
            .map_err(|source| self.output_error(Phase::Done, source))?;
        tracing::info!("crawl complete: {} comment(s)", self.emitted);
        Ok(self.emitted)
    }

    /// Phase 1: load the comments page, seed tokens and first records
    async fn fetch_initial(&mut self, sink: &mut dyn CommentSink) -> Result<Phase> {
        let url = urls::comments_page_url(&self.config.base_url, &self.video_id);
        tracing::debug!(%url, "fetching initial comments page");

        let response = self
            .client
            .get(&url)
            .await
            .map_err(|source| self.network_error(Phase::Initial, source))?;
        if !response.is_success() {
            return Err(self.transport_error(Phase::Initial, &response));
        }

        let records = extract_comments(&response.body)
            .map_err(|source| self.extract_error(Phase::Initial, source))?;
        for record in records {
            self.emit(Phase::Initial, record, sink)?;
        }
        self.queue_reply_groups(&response.body);

        // An absent or empty page token is normal: the video has at most one
        // page of top-level comments. A missing session token is fatal, since
        // no later request can be made without it.
        self.page_token = find_token(&response.body, PAGE_TOKEN_KEY, PAGE_TOKEN_OFFSET)
            .ok()
            .filter(|token| !token.is_empty());
        let session_token = find_token(&response.body, SESSION_TOKEN_KEY, SESSION_TOKEN_OFFSET)
            .map_err(|source| self.extract_error(Phase::Initial, source))?;
        if session_token.is_empty() {
            return Err(self.extract_error(
                Phase::Initial,
                ExtractError::TokenNotFound {
                    key: SESSION_TOKEN_KEY.to_string(),
                },
            ));
        }
        self.session_token = session_token;
        self.first_iteration = true;

        tracing::info!(
            "initial page: {} comment(s), {} reply group(s), continuation token {}",
            self.emitted,
            self.pending_replies.len(),
            if self.page_token.is_some() { "present" } else { "absent" }
        );
        Ok(Phase::Paginating)
    }

    /// Phase 2: replay the "show more comments" button until the token runs out
    ///
    /// The first request of a time-ordered crawl goes to the order endpoint
    /// with no page token: the platform re-seeds pagination when the sort
    /// order changes. A 503 retries the same iteration with the same
    /// parameters after a fixed backoff; nothing else is retried.
    async fn paginate(&mut self, sink: &mut dyn CommentSink) -> Result<Phase> {
        while let Some(page_token) = self.page_token.clone() {
            let response = if self.first_iteration && self.config.order_by_time {
                let url =
                    urls::load_comments_order_url(&self.config.base_url, &self.video_id, true);
                let form = [
                    ("video_id", self.video_id.as_str()),
                    ("session_token", self.session_token.as_str()),
                ];
                tracing::debug!(%url, "switching to time ordering");
                self.post(Phase::Paginating, &url, &form).await?
            } else {
                let url = urls::load_comments_more_url(
                    &self.config.base_url,
                    &self.video_id,
                    self.config.order_by_time,
                );
                let form = [
                    ("video_id", self.video_id.as_str()),
                    ("page_token", page_token.as_str()),
                    ("session_token", self.session_token.as_str()),
                ];
                tracing::debug!(%url, "requesting next comment page");
                self.post(Phase::Paginating, &url, &form).await?
            };

            if response.status == 503 {
                tracing::warn!(
                    "rate limited during pagination, retrying after {:?}",
                    self.config.rate_limit_backoff
                );
                sleep(self.config.rate_limit_backoff).await;
                continue;
            }
            if !response.is_success() {
                return Err(self.transport_error(Phase::Paginating, &response));
            }

            let (html, next_token) = parse_envelope(&response.body)
                .map_err(|reason| self.protocol_error(Phase::Paginating, reason))?;
            let records = extract_comments(&html)
                .map_err(|source| self.extract_error(Phase::Paginating, source))?;
            for record in records {
                self.emit(Phase::Paginating, record, sink)?;
            }
            self.queue_reply_groups(&html);

            self.page_token = next_token.filter(|token| !token.is_empty());
            self.first_iteration = false;
            sleep(self.config.request_delay).await;
        }

        tracing::info!(
            "pagination complete: {} comment(s) so far, {} reply group(s) pending",
            self.emitted,
            self.pending_replies.len()
        );
        Ok(Phase::ExpandingReplies)
    }

    /// Phase 3: expand every collapsed reply thread, in discovery order
    ///
    /// A 503 here drops the group after the backoff instead of retrying it.
    /// The asymmetry with the pagination phase is deliberate; see DESIGN.md
    /// before changing it.
    async fn expand_replies(&mut self, sink: &mut dyn CommentSink) -> Result<Phase> {
        let pending = std::mem::take(&mut self.pending_replies);
        let url = urls::load_replies_url(
            &self.config.base_url,
            &self.video_id,
            self.config.order_by_time,
        );

        for group_id in pending {
            let form = [
                ("comment_id", group_id.as_str()),
                ("video_id", self.video_id.as_str()),
                ("can_reply", "1"),
                ("session_token", self.session_token.as_str()),
            ];
            tracing::debug!(group = %group_id, "expanding reply group");
            let response = self.post(Phase::ExpandingReplies, &url, &form).await?;

            if response.status == 503 {
                tracing::warn!(group = %group_id, "rate limited, skipping reply group");
                sleep(self.config.rate_limit_backoff).await;
                continue;
            }
            if !response.is_success() {
                return Err(self.transport_error(Phase::ExpandingReplies, &response));
            }

            let (html, _) = parse_envelope(&response.body)
                .map_err(|reason| self.protocol_error(Phase::ExpandingReplies, reason))?;
            let records = extract_comments(&html)
                .map_err(|source| self.extract_error(Phase::ExpandingReplies, source))?;
            for record in records {
                self.emit(Phase::ExpandingReplies, record, sink)?;
            }
            sleep(self.config.request_delay).await;
        }

        Ok(Phase::Done)
    }

    /// Writes a record to the sink unless its id was already yielded
    fn emit(
        &mut self,
        phase: Phase,
        record: CommentRecord,
        sink: &mut dyn CommentSink,
    ) -> Result<()> {
        if !self.seen.insert(record.cid.clone()) {
            tracing::debug!(cid = %record.cid, "duplicate comment, skipping");
            return Ok(());
        }
        sink.write(&record)
            .map_err(|source| self.output_error(phase, source))?;
        self.emitted += 1;
        Ok(())
    }

    /// Queues newly discovered reply groups, preserving discovery order
    fn queue_reply_groups(&mut self, html: &str) {
        for group_id in extract_reply_group_ids(html) {
            if self.known_reply_groups.insert(group_id.clone()) {
                self.pending_replies.push(group_id);
            }
        }
    }

    async fn post(
        &self,
        phase: Phase,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<PageResponse> {
        self.client
            .post_form(url, form)
            .await
            .map_err(|source| self.network_error(phase, source))
    }

    fn transport_error(&self, phase: Phase, response: &PageResponse) -> CrawlError {
        CrawlError::Transport {
            phase,
            video_id: self.video_id.clone(),
            status: response.status,
            page_token: self.page_token.clone(),
        }
    }

    fn network_error(&self, phase: Phase, source: reqwest::Error) -> CrawlError {
        CrawlError::Network {
            phase,
            video_id: self.video_id.clone(),
            source,
        }
    }

    fn protocol_error(&self, phase: Phase, reason: String) -> CrawlError {
        CrawlError::Protocol {
            phase,
            video_id: self.video_id.clone(),
            reason,
            page_token: self.page_token.clone(),
        }
    }

    fn extract_error(&self, phase: Phase, source: ExtractError) -> CrawlError {
        CrawlError::Extract {
            phase,
            video_id: self.video_id.clone(),
            page_token: self.page_token.clone(),
            source,
        }
    }

    fn output_error(&self, phase: Phase, source: OutputError) -> CrawlError {
        CrawlError::Output {
            phase,
            video_id: self.video_id.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{CommentSink, OutputResult};

    struct CollectSink(Vec<CommentRecord>);

    impl CommentSink for CollectSink {
        fn write(&mut self, record: &CommentRecord) -> OutputResult<()> {
            self.0.push(record.clone());
            Ok(())
        }

        fn flush(&mut self) -> OutputResult<()> {
            Ok(())
        }

        fn count(&self) -> u64 {
            self.0.len() as u64
        }
    }

    fn test_crawler() -> Crawler {
        Crawler::new("vid123", CrawlConfig::default()).unwrap()
    }

    fn record(cid: &str) -> CommentRecord {
        CommentRecord {
            cid: cid.to_string(),
            text: String::new(),
            time: String::new(),
        }
    }

    #[test]
    fn test_parse_envelope_with_token() {
        let body = r#"{"html_content": "<div></div>", "page_token": "tok2"}"#;
        let (html, token) = parse_envelope(body).unwrap();
        assert_eq!(html, "<div></div>");
        assert_eq!(token.as_deref(), Some("tok2"));
    }

    #[test]
    fn test_parse_envelope_without_token() {
        let body = r#"{"html_content": "x"}"#;
        let (_, token) = parse_envelope(body).unwrap();
        assert!(token.is_none());
    }

    #[test]
    fn test_parse_envelope_missing_html_content() {
        let reason = parse_envelope(r#"{"page_token": "tok"}"#).unwrap_err();
        assert_eq!(reason, "missing html_content field");
    }

    #[test]
    fn test_parse_envelope_rejects_non_json() {
        let reason = parse_envelope("<html>Service Unavailable</html>").unwrap_err();
        assert!(reason.starts_with("not a JSON envelope"));
    }

    #[test]
    fn test_emit_deduplicates_by_cid() {
        let mut crawler = test_crawler();
        let mut sink = CollectSink(Vec::new());

        crawler.emit(Phase::Initial, record("a"), &mut sink).unwrap();
        crawler.emit(Phase::Initial, record("b"), &mut sink).unwrap();
        crawler
            .emit(Phase::Paginating, record("a"), &mut sink)
            .unwrap();

        let cids: Vec<&str> = sink.0.iter().map(|r| r.cid.as_str()).collect();
        assert_eq!(cids, vec!["a", "b"]);
        assert_eq!(crawler.emitted, 2);
    }

    struct FailingSink;

    impl CommentSink for FailingSink {
        fn write(&mut self, _record: &CommentRecord) -> OutputResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
        }

        fn flush(&mut self) -> OutputResult<()> {
            Ok(())
        }

        fn count(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_sink_failure_carries_phase_context() {
        let mut crawler = test_crawler();
        let mut sink = FailingSink;

        let err = crawler
            .emit(Phase::ExpandingReplies, record("a"), &mut sink)
            .unwrap_err();
        match err {
            CrawlError::Output { phase, video_id, .. } => {
                assert_eq!(phase, Phase::ExpandingReplies);
                assert_eq!(video_id, "vid123");
            }
            other => panic!("expected output error, got: {}", other),
        }
    }

    #[test]
    fn test_queue_reply_groups_deduplicates_preserving_order() {
        let mut crawler = test_crawler();
        let fragment = |ids: &[&str]| {
            ids.iter()
                .map(|id| {
                    format!(
                        r#"<div class="comment-replies-header"><a class="load-comments" data-cid="{}">x</a></div>"#,
                        id
                    )
                })
                .collect::<String>()
        };

        crawler.queue_reply_groups(&fragment(&["g1", "g2"]));
        crawler.queue_reply_groups(&fragment(&["g2", "g3"]));

        assert_eq!(crawler.pending_replies, vec!["g1", "g2", "g3"]);
    }

    #[test]
    fn test_rejects_malformed_base_url() {
        let config = CrawlConfig {
            base_url: "not a url".to_string(),
            ..CrawlConfig::default()
        };
        let err = Crawler::new("vid123", config).unwrap_err();
        assert!(matches!(err, CrawlError::BaseUrl { .. }));
    }

    #[test]
    fn test_phase_display_names() {
        assert_eq!(Phase::Initial.to_string(), "initial page load");
        assert_eq!(Phase::Paginating.to_string(), "pagination");
        assert_eq!(Phase::ExpandingReplies.to_string(), "reply expansion");
    }
}
