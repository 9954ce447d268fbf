//! Utility functions for RSS feed processing.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use unicode_segmentation::UnicodeSegmentation;

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Parse a date string in various formats
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(date_str) {
        return Some(date.with_timezone(&Utc));
    }

    if let Ok(date) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }

    // Zone-less formats are taken as UTC.
    for format in &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(date.and_utc());
        }
    }
    for format in &["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

/// Clean up malformed XML
pub fn cleanup_xml(xml: &str) -> String {
    let trimmed = xml.trim();
    let mut cleaned = trimmed.strip_prefix('\u{FEFF}').unwrap_or(trimmed);

    // Drop anything before the document proper
    for marker in ["<?xml", "<rss", "<feed"] {
        if let Some(start) = cleaned.find(marker) {
            cleaned = &cleaned[start..];
            break;
        }
    }

    let cleaned = cleaned
        .replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&rsquo;", "&#8217;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rdquo;", "&#8221;")
        .replace("&ldquo;", "&#8220;")
        .replace("&amp;amp;", "&amp;")
        .replace("&apos;", "&#39;");

    let cleaned: String = cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' | // tab
                '\u{000A}' | // newline
                '\u{000D}' | // carriage return
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect();

    if cleaned.starts_with("<?xml") {
        cleaned
    } else {
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}", cleaned)
    }
}

/// Lowercased word tokens of a title, as stored in the `words` column.
pub fn tokenize_title(title: &str) -> Vec<String> {
    title
        .unicode_words()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .map(str::to_lowercase)
        .collect()
}

/// Calendar day of `published` in the newsroom's fixed UTC offset.
pub fn feed_date_for(published: DateTime<Utc>, utc_offset_hours: i32) -> NaiveDate {
    match FixedOffset::east_opt(utc_offset_hours * 3600) {
        Some(offset) => published.with_timezone(&offset).date_naive(),
        None => published.date_naive(),
    }
}
