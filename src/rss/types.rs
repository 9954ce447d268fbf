//! Type definitions for the RSS module.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

/// JSON feed structure for parsing
#[derive(Debug, Deserialize)]
pub struct JsonFeed {
    #[serde(default)]
    pub items: Vec<JsonFeedItem>,
}

/// JSON feed item structure
#[derive(Debug, Deserialize)]
pub struct JsonFeedItem {
    pub id: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub date_published: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One feed entry as read from the wire, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub title: String,
    pub link: String,
    pub category: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// A normalized, classified feed item ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RssItem {
    pub source_id: i64,
    pub lang: String,
    pub title: String,
    pub link: String,
    pub words: Vec<String>,
    pub category: String,
    pub sentiment_key: Option<String>,
    pub sentiment_value: Option<f64>,
    pub sentiment_compound: Option<f64>,
    pub published: DateTime<Utc>,
    pub feed_date: NaiveDate,
}

/// Worker pool settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub lang: String,
    pub workers: usize,
    pub utc_offset_hours: i32,
}

impl IngestOptions {
    pub fn new(lang: &str) -> Self {
        IngestOptions {
            lang: lang.to_string(),
            workers: DEFAULT_WORKERS,
            utc_offset_hours: 1,
        }
    }
}

// Constants
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
pub const MAX_RETRIES: usize = 3;
pub const DEFAULT_WORKERS: usize = 6;
