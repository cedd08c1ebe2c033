//! Comment markup extractor
//!
//! Parses the server-rendered comment widgets out of a page or AJAX
//! fragment. The platform renders every comment (top-level or reply) as a
//! `.comment-item` node carrying a `data-cid` attribute, a
//! `.comment-text-content` child, and a `.time` child; threads with
//! collapsed replies additionally render a "load more replies" link inside
//! `.comment-replies-header`.

use super::{ExtractError, ExtractResult};
use scraper::{Html, Selector};
use serde::Serialize;

/// One extracted comment
///
/// Immutable once produced. Identity is `cid`; crawl-wide uniqueness is the
/// crawler's responsibility, not the extractor's. Field names are the output
/// contract (one JSON object per line uses exactly these keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    /// Platform comment identifier
    pub cid: String,

    /// Comment body text as rendered
    pub text: String,

    /// Platform-formatted timestamp, trimmed but not normalized
    pub time: String,
}

const COMMENT_ITEM: &str = ".comment-item";
const COMMENT_TEXT: &str = ".comment-text-content";
const COMMENT_TIME: &str = ".time";
const REPLY_LINK: &str = ".comment-replies-header > .load-comments";

fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

/// Extracts every comment record from an HTML page or fragment
///
/// # Arguments
///
/// * `html` - Raw HTML, either the initial comments page or the
///   `html_content` field of a continuation envelope
///
/// # Returns
///
/// * `Ok(Vec<CommentRecord>)` - One record per `.comment-item` node, in
///   document order
/// * `Err(ExtractError::MalformedItem)` - An item is missing its id
///   attribute, text node, or time node
pub fn extract_comments(html: &str) -> ExtractResult<Vec<CommentRecord>> {
    let document = Html::parse_document(html);
    let item_sel = selector(COMMENT_ITEM)?;
    let text_sel = selector(COMMENT_TEXT)?;
    let time_sel = selector(COMMENT_TIME)?;

    let mut records = Vec::new();
    for (index, item) in document.select(&item_sel).enumerate() {
        let cid = item
            .value()
            .attr("data-cid")
            .ok_or(ExtractError::MalformedItem {
                index,
                field: "data-cid attribute",
            })?;

        let text = item
            .select(&text_sel)
            .next()
            .ok_or(ExtractError::MalformedItem {
                index,
                field: "text node",
            })?
            .text()
            .collect::<String>();

        let time = item
            .select(&time_sel)
            .next()
            .ok_or(ExtractError::MalformedItem {
                index,
                field: "time node",
            })?
            .text()
            .collect::<String>()
            .trim()
            .to_string();

        records.push(CommentRecord {
            cid: cid.to_string(),
            text,
            time,
        });
    }

    Ok(records)
}

/// Extracts the ids of reply groups whose replies must be fetched separately
///
/// Returns the `data-cid` of every "load more replies" link, in document
/// order. Duplicates across fragments are expected; deduplication is the
/// caller's job. Links without a `data-cid` are skipped with a debug log
/// (only comment items carry the malformed-item contract).
pub fn extract_reply_group_ids(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let reply_sel = match selector(REPLY_LINK) {
        Ok(sel) => sel,
        Err(_) => return Vec::new(),
    };

    document
        .select(&reply_sel)
        .filter_map(|link| match link.value().attr("data-cid") {
            Some(cid) => Some(cid.to_string()),
            None => {
                tracing::debug!("reply link without data-cid, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(cid: &str, text: &str, time: &str) -> String {
        format!(
            r#"<div class="comment-item" data-cid="{}">
                <div class="comment-text-content">{}</div>
                <span class="time"> {} </span>
            </div>"#,
            cid, text, time
        )
    }

    #[test]
    fn test_extract_single_comment() {
        let html = item("abc123", "first!", "1 hour ago");
        let records = extract_comments(&html).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cid, "abc123");
        assert_eq!(records[0].text, "first!");
        assert_eq!(records[0].time, "1 hour ago");
    }

    #[test]
    fn test_extract_preserves_document_order() {
        let html = format!("{}{}{}", item("a", "A", "1h"), item("b", "B", "2h"), item("c", "C", "3h"));
        let records = extract_comments(&html).unwrap();
        let cids: Vec<&str> = records.iter().map(|r| r.cid.as_str()).collect();
        assert_eq!(cids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_time_is_trimmed_text_is_not() {
        let html = r#"<div class="comment-item" data-cid="x">
            <div class="comment-text-content">  spaced  </div>
            <span class="time">
                2 days ago
            </span>
        </div>"#;
        let records = extract_comments(html).unwrap();
        assert_eq!(records[0].text, "  spaced  ");
        assert_eq!(records[0].time, "2 days ago");
    }

    #[test]
    fn test_missing_cid_is_malformed() {
        let html = r#"<div class="comment-item">
            <div class="comment-text-content">hi</div>
            <span class="time">now</span>
        </div>"#;
        let err = extract_comments(html).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedItem {
                index: 0,
                field: "data-cid attribute"
            }
        );
    }

    #[test]
    fn test_missing_text_node_is_malformed() {
        let html = format!(
            "{}{}",
            item("ok", "fine", "1h"),
            r#"<div class="comment-item" data-cid="bad"><span class="time">now</span></div>"#
        );
        let err = extract_comments(&html).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedItem {
                index: 1,
                field: "text node"
            }
        );
    }

    #[test]
    fn test_missing_time_node_is_malformed() {
        let html = r#"<div class="comment-item" data-cid="bad">
            <div class="comment-text-content">hi</div>
        </div>"#;
        let err = extract_comments(html).unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedItem {
                index: 0,
                field: "time node"
            }
        );
    }

    #[test]
    fn test_no_items_yields_empty() {
        let records = extract_comments("<html><body><p>no comments</p></body></html>").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_reply_group_ids() {
        let html = r#"
            <div class="comment-replies-header">
                <a class="load-comments" data-cid="g1">View all 3 replies</a>
            </div>
            <div class="comment-replies-header">
                <a class="load-comments" data-cid="g2">View all 7 replies</a>
            </div>
        "#;
        assert_eq!(extract_reply_group_ids(html), vec!["g1", "g2"]);
    }

    #[test]
    fn test_reply_link_must_be_direct_child_of_header() {
        let html = r#"<div class="comment-replies-header"><div><a class="load-comments" data-cid="nested">x</a></div></div>
            <a class="load-comments" data-cid="orphan">y</a>"#;
        assert!(extract_reply_group_ids(html).is_empty());
    }

    #[test]
    fn test_reply_link_without_cid_is_skipped() {
        let html = r#"<div class="comment-replies-header">
            <a class="load-comments">no id</a>
            <a class="load-comments" data-cid="g1">ok</a>
        </div>"#;
        assert_eq!(extract_reply_group_ids(html), vec!["g1"]);
    }
}
