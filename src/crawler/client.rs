//! HTTP session client
//!
//! A thin wrapper over `reqwest` holding the per-crawl session. The cookie
//! store is what makes consecutive AJAX calls belong to one browsing
//! session; the platform pairs those cookies with the anti-forgery token
//! extracted from the initial page.
//!
//! No retry or backoff logic lives here; status-code policy is the
//! crawler's responsibility.

use reqwest::Client;
use std::time::Duration;

/// User agent presented to the platform
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Status code plus raw text body of one response
#[derive(Debug)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Cookie-persisting HTTP client scoped to one crawl
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: Client,
}

impl SessionClient {
    /// Builds a client with the given total per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Issues a GET request, returning status and raw body
    pub async fn get(&self, url: &str) -> Result<PageResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }

    /// Issues a form-encoded POST request, returning status and raw body
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<PageResponse, reqwest::Error> {
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(PageResponse { status, body })
    }
}
