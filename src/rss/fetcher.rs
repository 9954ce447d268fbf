//! Bounded worker pool that reads every source of a language, classifies each
//! entry, and funnels the results into one list.

use anyhow::Result;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::client::{create_http_client, fetch_once};
use super::parser::parse_feed;
use super::types::{IngestOptions, ParsedEntry, RssItem, MAX_RETRIES, RETRY_DELAY};
use super::util::{feed_date_for, is_valid_url, tokenize_title};
use crate::db::Cancellation;
use crate::models::SourceFeed;
use crate::repository::Repository;
use crate::sentiment::SentimentAnalyzer;
use crate::{TARGET_CLASSIFIER, TARGET_WEB_REQUEST};

/// Source of parsed feed entries, keyed by feed URL.
pub trait FeedFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<ParsedEntry>>>;
}

/// Fetches over HTTP, retrying failed requests and unparseable bodies.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new() -> Result<Self> {
        Ok(HttpFeedFetcher {
            client: create_http_client()?,
        })
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<Vec<ParsedEntry>> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(target: TARGET_WEB_REQUEST, "Loading RSS feed from {} (attempt {})", url, attempts);

            let outcome = match fetch_once(&self.client, url).await {
                Ok(body) => parse_feed(&body.text, body.content_type.as_deref(), url),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(entries) => return Ok(entries),
                Err(err) if attempts >= MAX_RETRIES => {
                    error!(target: TARGET_WEB_REQUEST, "Max retries reached for URL: {}, moving on", url);
                    return Err(err);
                }
                Err(err) => {
                    warn!(target: TARGET_WEB_REQUEST, "Request to {} failed: {}", url, err);
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }
}

impl FeedFetcher for HttpFeedFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<ParsedEntry>>> {
        self.fetch_with_retries(url).boxed()
    }
}

/// Load the sources registered for `options.lang` and ingest all of them.
pub async fn read_sources(
    repo: &Repository,
    fetcher: Arc<dyn FeedFetcher>,
    classifier: Arc<dyn SentimentAnalyzer>,
    options: &IngestOptions,
    cancel: &Cancellation,
) -> Result<Vec<RssItem>> {
    let sources = repo.sources_by_language(&options.lang, cancel).await?;
    info!(
        target: TARGET_WEB_REQUEST,
        "Reading {} sources for language {}",
        sources.len(),
        options.lang
    );
    Ok(process_sources(sources, fetcher, classifier, options, cancel).await)
}

/// Run `sources` through a pool of `options.workers` tasks.
///
/// Workers pull from a shared queue and push one batch per source onto a
/// single results channel. Collection ends once every worker has dropped its
/// sender; the pool is then joined. Cancellation stops workers from taking
/// new sources but keeps what was already collected.
pub async fn process_sources(
    sources: Vec<SourceFeed>,
    fetcher: Arc<dyn FeedFetcher>,
    classifier: Arc<dyn SentimentAnalyzer>,
    options: &IngestOptions,
    cancel: &Cancellation,
) -> Vec<RssItem> {
    let workers = options.workers.max(1);
    let (work_tx, work_rx) = mpsc::channel::<SourceFeed>(workers);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<Vec<RssItem>>(workers);

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        let work_rx = Arc::clone(&work_rx);
        let result_tx = result_tx.clone();
        let fetcher = Arc::clone(&fetcher);
        let classifier = Arc::clone(&classifier);
        let cancel = cancel.clone();
        let utc_offset_hours = options.utc_offset_hours;

        pool.spawn(async move {
            loop {
                let next = work_rx.lock().await.recv().await;
                let Some(source) = next else {
                    break;
                };
                if cancel.is_cancelled() {
                    debug!(target: TARGET_WEB_REQUEST, "Worker {} stopping on cancellation", worker);
                    break;
                }
                let items = process_source(
                    &source,
                    fetcher.as_ref(),
                    classifier.as_ref(),
                    utc_offset_hours,
                )
                .await;
                if !items.is_empty() && result_tx.send(items).await.is_err() {
                    break;
                }
            }
            debug!(target: TARGET_WEB_REQUEST, "Worker {} finished", worker);
        });
    }
    drop(result_tx);
    drop(work_rx);

    // Feed work
    pool.spawn(async move {
        for source in sources {
            if work_tx.send(source).await.is_err() {
                break;
            }
        }
    });

    let mut feeds = Vec::new();
    while let Some(batch) = result_rx.recv().await {
        feeds.extend(batch);
    }

    while let Some(joined) = pool.join_next().await {
        if let Err(err) = joined {
            error!(target: TARGET_WEB_REQUEST, "Ingestion task failed: {}", err);
        }
    }

    info!(target: TARGET_WEB_REQUEST, "Collected {} feed items", feeds.len());
    feeds
}

async fn process_source(
    source: &SourceFeed,
    fetcher: &dyn FeedFetcher,
    classifier: &dyn SentimentAnalyzer,
    utc_offset_hours: i32,
) -> Vec<RssItem> {
    if !is_valid_url(&source.rss) {
        warn!(target: TARGET_WEB_REQUEST, "Skipping invalid URL for source {}: {}", source.id, source.rss);
        return Vec::new();
    }

    info!(target: TARGET_WEB_REQUEST, "Source: {} (lang: {})", source.rss, source.lang);
    let entries = match fetcher.fetch(&source.rss).await {
        Ok(entries) => entries,
        Err(err) => {
            error!(target: TARGET_WEB_REQUEST, "Fetch error for source {}: {}", source.id, err);
            return Vec::new();
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let published = entry.published.unwrap_or_else(Utc::now);
        let mut item = RssItem {
            source_id: source.id,
            lang: source.lang.clone(),
            words: tokenize_title(&entry.title),
            title: entry.title,
            link: entry.link,
            category: entry.category.unwrap_or_default(),
            sentiment_key: None,
            sentiment_value: None,
            sentiment_compound: None,
            published,
            feed_date: feed_date_for(published, utc_offset_hours),
        };

        match classifier.analyze(&source.lang, &item.title).await {
            Ok(scores) => {
                if let Some((key, value)) = scores.dominant() {
                    item.sentiment_key = Some(key);
                    item.sentiment_value = Some(value);
                }
                item.sentiment_compound = scores.compound();
            }
            Err(err) if err.is_auth() => {
                error!(target: TARGET_CLASSIFIER, "Sentiment auth failure (source {}): {}", source.id, err);
            }
            Err(err) => {
                warn!(target: TARGET_CLASSIFIER, "Sentiment analyze error (source {}): {}", source.id, err);
            }
        }
        items.push(item);
    }
    items
}
