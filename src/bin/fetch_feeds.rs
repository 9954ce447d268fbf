use anyhow::{anyhow, Result};
use clap::Parser;
use prettytable::{Cell, Row as PrettyRow, Table};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, Level};

use pow_analytics::config::Config;
use pow_analytics::rss::{read_sources, HttpFeedFetcher, IngestOptions, RssItem};
use pow_analytics::sentiment::{SentimentClient, CLASSIFIER_TIMEOUT};
use pow_analytics::{Cancellation, Database, Repository};

#[derive(Parser)]
#[clap(name = "fetch_feeds", about = "Fetch and classify every RSS source of a language")]
struct Cli {
    /// Source language code
    #[clap(short, long, default_value = "hun")]
    lang: String,

    /// Concurrent source workers (defaults to INGEST_WORKERS)
    #[clap(short, long)]
    workers: Option<usize>,

    /// Print every item instead of the per-source summary
    #[clap(short, long)]
    items: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    pow_analytics::logging::setup_logging("fetch_feeds", Level::INFO);

    let args = Cli::parse();
    let config = Config::from_env()?;

    let sentiment_url = config
        .ingest
        .sentiment_url
        .as_deref()
        .ok_or_else(|| anyhow!("SENTIMENT_URL is required"))?;
    let classifier = SentimentClient::new(
        sentiment_url,
        &config.ingest.sentiment_token,
        CLASSIFIER_TIMEOUT,
    )?;

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_err() {
            error!("Failed to listen for ctrl-c");
        }
        let _ = cancel_tx.send(true);
    });

    let db = Database::connect(&config.database).await?;
    let repo = Repository::new(Arc::new(db.clone()));

    let options = IngestOptions {
        workers: args.workers.unwrap_or(config.ingest.workers).max(1),
        utc_offset_hours: config.ingest.feed_utc_offset_hours,
        ..IngestOptions::new(&args.lang)
    };

    let items = read_sources(
        &repo,
        Arc::new(HttpFeedFetcher::new()?),
        Arc::new(classifier),
        &options,
        &Cancellation::from_signal(cancel_rx),
    )
    .await;
    db.close().await;
    let items = items?;

    if args.items {
        print_items(&items);
    } else {
        print_summary(&items);
    }
    Ok(())
}

fn print_summary(items: &[RssItem]) {
    // source id -> (items, positive, negative, neutral, unclassified)
    let mut per_source: BTreeMap<i64, [usize; 5]> = BTreeMap::new();
    for item in items {
        let counts = per_source.entry(item.source_id).or_default();
        counts[0] += 1;
        match item.sentiment_key.as_deref() {
            Some("positive") => counts[1] += 1,
            Some("negative") => counts[2] += 1,
            Some("neutral") => counts[3] += 1,
            _ => counts[4] += 1,
        }
    }

    let mut table = Table::new();
    table.add_row(PrettyRow::new(vec![
        Cell::new("Source"),
        Cell::new("Items"),
        Cell::new("Positive"),
        Cell::new("Negative"),
        Cell::new("Neutral"),
        Cell::new("Unclassified"),
    ]));
    for (source_id, counts) in &per_source {
        let mut cells = vec![Cell::new(&source_id.to_string())];
        cells.extend(counts.iter().map(|c| Cell::new(&c.to_string())));
        table.add_row(PrettyRow::new(cells));
    }
    table.printstd();
    println!("{} items from {} sources", items.len(), per_source.len());
}

fn print_items(items: &[RssItem]) {
    let mut table = Table::new();
    table.add_row(PrettyRow::new(vec![
        Cell::new("Source"),
        Cell::new("Feed date"),
        Cell::new("Sentiment"),
        Cell::new("Compound"),
        Cell::new("Title"),
    ]));
    for item in items {
        let sentiment = match (&item.sentiment_key, item.sentiment_value) {
            (Some(key), Some(value)) => format!("{} ({:.2})", key, value),
            _ => "-".to_string(),
        };
        let compound = item
            .sentiment_compound
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(PrettyRow::new(vec![
            Cell::new(&item.source_id.to_string()),
            Cell::new(&item.feed_date.to_string()),
            Cell::new(&sentiment),
            Cell::new(&compound),
            Cell::new(&item.title.chars().take(80).collect::<String>()),
        ]));
    }
    table.printstd();
}
