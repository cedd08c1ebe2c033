//! Platform URL templates
//!
//! These query strings and parameter names are the platform's contract, not
//! an internal choice; changing any of them breaks the AJAX endpoints.
//! `base` is a parameter (rather than a constant) so tests can point the
//! crawler at a mock server.

/// Initial comments page for a video
pub fn comments_page_url(base: &str, video_id: &str) -> String {
    format!("{}/all_comments?v={}", base, video_id)
}

/// Endpoint that re-seeds pagination when switching sort order
///
/// The first continuation request of a time-ordered crawl goes here, with
/// no page token in the body.
pub fn load_comments_order_url(base: &str, video_id: &str, order_by_time: bool) -> String {
    format!(
        "{}/comment_ajax?action_load_comments=1&order_by_time={}&filter={}&order_menu=true",
        base, order_by_time, video_id
    )
}

/// "Show more comments" continuation endpoint
pub fn load_comments_more_url(base: &str, video_id: &str, order_by_time: bool) -> String {
    format!(
        "{}/comment_ajax?action_load_comments=1&order_by_time={}&filter={}",
        base, order_by_time, video_id
    )
}

/// Reply-expansion endpoint for one comment thread
pub fn load_replies_url(base: &str, video_id: &str, order_by_time: bool) -> String {
    format!(
        "{}/comment_ajax?action_load_replies=1&order_by_time={}&filter={}&tab=inbox",
        base, order_by_time, video_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.youtube.com";

    #[test]
    fn test_comments_page_url() {
        assert_eq!(
            comments_page_url(BASE, "vid123"),
            "https://www.youtube.com/all_comments?v=vid123"
        );
    }

    #[test]
    fn test_order_url() {
        assert_eq!(
            load_comments_order_url(BASE, "vid123", true),
            "https://www.youtube.com/comment_ajax?action_load_comments=1&order_by_time=true&filter=vid123&order_menu=true"
        );
    }

    #[test]
    fn test_more_url() {
        assert_eq!(
            load_comments_more_url(BASE, "vid123", false),
            "https://www.youtube.com/comment_ajax?action_load_comments=1&order_by_time=false&filter=vid123"
        );
    }

    #[test]
    fn test_replies_url() {
        assert_eq!(
            load_replies_url(BASE, "vid123", true),
            "https://www.youtube.com/comment_ajax?action_load_replies=1&order_by_time=true&filter=vid123&tab=inbox"
        );
    }
}
