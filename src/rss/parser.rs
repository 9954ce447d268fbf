//! Feed parsing logic for RSS, Atom, and JSON formats.

use anyhow::{anyhow, Result};
use feed_rs::parser;
use std::io::Cursor;
use tracing::{debug, error};

use super::types::{JsonFeed, ParsedEntry};
use super::util::{cleanup_xml, parse_date};
use crate::TARGET_WEB_REQUEST;

/// Parse a fetched feed body into entries.
///
/// JSON feeds are recognized by content type. Anything else goes through
/// `feed-rs`; if that fails and the body still looks like RSS or Atom, it is
/// cleaned up and parsed once more. Entries without a title or link are
/// skipped.
pub fn parse_feed(body: &str, content_type: Option<&str>, url: &str) -> Result<Vec<ParsedEntry>> {
    if content_type.is_some_and(|ct| ct.contains("json")) {
        debug!(target: TARGET_WEB_REQUEST, "Processing as JSON feed: {}", url);
        let feed = serde_json::from_str::<JsonFeed>(body).map_err(|err| {
            error!(target: TARGET_WEB_REQUEST, "Failed to parse JSON feed from {}: {}", url, err);
            anyhow!("JSON parsing error: {}", err)
        })?;
        return Ok(entries_from_json(feed));
    }

    debug!(target: TARGET_WEB_REQUEST, "Processing as XML feed: {}", url);
    match parser::parse(Cursor::new(body)) {
        Ok(feed) => Ok(entries_from_feed(feed)),
        Err(first_err) => {
            let cleaned = cleanup_xml(body);
            if !(cleaned.contains("<rss") || cleaned.contains("<feed")) {
                error!(
                    target: TARGET_WEB_REQUEST,
                    "Feed from {} doesn't appear to be RSS or Atom. Content preview: {}",
                    url,
                    preview(body)
                );
                return Err(anyhow!("Content is not RSS or Atom feed"));
            }

            match parser::parse(Cursor::new(cleaned)) {
                Ok(feed) => {
                    debug!(target: TARGET_WEB_REQUEST, "Feed from {} parsed after XML cleanup", url);
                    Ok(entries_from_feed(feed))
                }
                Err(second_err) => {
                    error!(
                        target: TARGET_WEB_REQUEST,
                        "Failed to parse feed from {} after cleanup. First error: {}. Second error: {}",
                        url,
                        first_err,
                        second_err
                    );
                    Err(anyhow!("XML parsing error even after cleanup"))
                }
            }
        }
    }
}

fn entries_from_json(feed: JsonFeed) -> Vec<ParsedEntry> {
    feed.items
        .into_iter()
        .filter_map(|item| {
            let link = item.url.or(item.id)?;
            let title = non_blank(item.title)?;
            Some(ParsedEntry {
                title,
                link,
                category: item.tags.into_iter().next(),
                published: item.date_published.as_deref().and_then(parse_date),
            })
        })
        .collect()
}

fn entries_from_feed(feed: feed_rs::model::Feed) -> Vec<ParsedEntry> {
    feed.entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first().map(|link| link.href.clone())?;
            let title = non_blank(entry.title.map(|t| t.content))?;
            Some(ParsedEntry {
                title,
                link,
                category: entry.categories.first().map(|c| c.term.clone()),
                published: entry.published.or(entry.updated),
            })
        })
        .collect()
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn preview(body: &str) -> String {
    if body.chars().all(|c| c.is_ascii_graphic() || c.is_whitespace()) {
        body.chars().take(100).collect()
    } else {
        "[binary data]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Telex</title>
    <link>https://telex.hu</link>
    <description>Hírek</description>
    <item>
      <title>Emelkedik a forint árfolyama</title>
      <link>https://telex.hu/gazdasag/1</link>
      <category>Gazdaság</category>
      <pubDate>Tue, 05 Mar 2024 15:30:00 +0100</pubDate>
    </item>
    <item>
      <title>   </title>
      <link>https://telex.hu/gazdasag/2</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss() {
        let entries = parse_feed(RSS, Some("application/rss+xml"), "https://telex.hu/rss").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Emelkedik a forint árfolyama");
        assert_eq!(entries[0].link, "https://telex.hu/gazdasag/1");
        assert_eq!(entries[0].category.as_deref(), Some("Gazdaság"));
        assert_eq!(
            entries[0].published,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_json_feed() {
        let body = r#"{"version": "https://jsonfeed.org/version/1.1", "items": [
            {"id": "https://hvg.hu/a/1", "title": "Új költségvetés", "date_published": "2024-03-05T10:00:00Z", "tags": ["itthon"]},
            {"id": "2"}
        ]}"#;
        let entries = parse_feed(body, Some("application/feed+json"), "https://hvg.hu/feed").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://hvg.hu/a/1");
        assert_eq!(entries[0].category.as_deref(), Some("itthon"));
    }

    #[test]
    fn test_not_a_feed() {
        assert!(parse_feed("<html><body>hello</body></html>", Some("text/html"), "x").is_err());
        assert!(parse_feed("{not json", Some("application/json"), "x").is_err());
    }
}
