//! HTTP client creation and request handling for RSS feeds.

use anyhow::{anyhow, Result};
use reqwest::header;
use tracing::debug;

use super::types::REQUEST_TIMEOUT;
use crate::TARGET_WEB_REQUEST;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const ACCEPT: &str = "application/feed+json, application/json, application/rss+xml, application/atom+xml, application/xml, text/xml, */*;q=0.9";

/// Shared client for every feed request of one ingestion run.
pub fn create_http_client() -> Result<reqwest::Client> {
    debug!(target: TARGET_WEB_REQUEST, "Creating feed HTTP client");
    reqwest::Client::builder()
        .gzip(true)
        .timeout(REQUEST_TIMEOUT)
        .redirect(reqwest::redirect::Policy::default())
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}

/// Fetched feed body with its lowercased content type, if any.
#[derive(Debug)]
pub struct FeedBody {
    pub text: String,
    pub content_type: Option<String>,
}

/// Single GET of a feed URL. Non-success statuses are errors.
pub async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<FeedBody> {
    debug!(target: TARGET_WEB_REQUEST, "Requesting {}", url);

    let response = client
        .get(url)
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, ACCEPT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("Non-success status {} from {}", status, url));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(|s| s.to_lowercase());

    let text = response.text().await?;
    Ok(FeedBody { text, content_type })
}
