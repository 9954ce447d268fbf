//! RSS ingestion: fetching, parsing, tokenizing and classifying feed items
//! from every registered source of a language.

mod client;
mod fetcher;
mod parser;
mod types;
mod util;

pub use self::client::{create_http_client, fetch_once, FeedBody};
pub use self::fetcher::{process_sources, read_sources, FeedFetcher, HttpFeedFetcher};
pub use self::parser::parse_feed;
pub use self::types::*;
pub use self::util::{cleanup_xml, feed_date_for, is_valid_url, parse_date, tokenize_title};
