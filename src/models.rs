//! Records decoded from query results and the response shapes built from them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Inclusive calendar-day range, validated so `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedDateRange);
        }
        Ok(DateRange { start, end })
    }

    /// Parse both ends as `YYYY-MM-DD`; either missing is a validation error.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationError> {
        let (Some(start), Some(end)) = (non_blank(start), non_blank(end)) else {
            return Err(ValidationError::MissingDateRange);
        };
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate { field: "start_date" })?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate { field: "end_date" })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// `start 00:00:00`, for predicates on publish timestamps.
    pub fn start_of_day(&self) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN)
    }

    /// `end 23:59:59`, for predicates on publish timestamps.
    pub fn end_of_day(&self) -> NaiveDateTime {
        self.end.and_hms_opt(23, 59, 59).unwrap_or(self.start_of_day())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Categorical sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Positive,
    Negative,
    Neutral,
}

impl SentimentClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentClass::Positive => "positive",
            SentimentClass::Negative => "negative",
            SentimentClass::Neutral => "neutral",
        }
    }

    /// Case-insensitive; anything unrecognised is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "positive" => Some(SentimentClass::Positive),
            "negative" => Some(SentimentClass::Negative),
            "neutral" => Some(SentimentClass::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dimension used to bucket grouped sentiment counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Source,
    Date,
}

impl FromStr for GroupBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "source" => Ok(GroupBy::Source),
            "date" => Ok(GroupBy::Date),
            other => Err(ValidationError::InvalidChoice {
                field: "group_by",
                value: other.to_string(),
            }),
        }
    }
}

/// Calendar bucket used by phrase trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateGroup {
    Week,
    #[default]
    Month,
}

impl DateGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateGroup::Week => "week",
            DateGroup::Month => "month",
        }
    }
}

impl FromStr for DateGroup {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(DateGroup::Week),
            "month" => Ok(DateGroup::Month),
            other => Err(ValidationError::InvalidChoice {
                field: "date_group",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    pub link: Option<String>,
    pub source_id: i64,
    pub words: Vec<String>,
    pub published: DateTime<Utc>,
    pub feed_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSentiment {
    pub id: i64,
    pub sentiment_key: Option<String>,
    pub sentiment_value: f64,
    pub sentiment_compound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
}

/// One listed feed with its current sentiment and publisher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    #[serde(rename = "feeds")]
    pub feed: Feed,
    #[serde(rename = "feed_sentiments")]
    pub sentiment: FeedSentiment,
    #[serde(rename = "sources")]
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedPage {
    pub total: i64,
    pub page: u32,
    pub feeds: Vec<FeedEntry>,
}

impl FeedPage {
    pub fn empty(page: u32) -> Self {
        FeedPage {
            total: 0,
            page,
            feeds: Vec::new(),
        }
    }
}

/// (group key, sentiment class, count) as returned by the grouped query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedCount {
    pub group_by: String,
    pub sentiment_key: String,
    pub count: i64,
}

impl GroupedCount {
    pub fn new(group_by: &str, sentiment_key: &str, count: i64) -> Self {
        GroupedCount {
            group_by: group_by.to_string(),
            sentiment_key: sentiment_key.to_string(),
            count,
        }
    }
}

/// Three count series aligned index-for-index with `keys`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SeriesResult {
    #[serde(rename = "Negative")]
    pub negative: Vec<i64>,
    #[serde(rename = "Neutral")]
    pub neutral: Vec<i64>,
    #[serde(rename = "Positive")]
    pub positive: Vec<i64>,
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentCounts {
    #[serde(rename = "positive_sentiments")]
    pub positive: i64,
    #[serde(rename = "negative_sentiments")]
    pub negative: i64,
    #[serde(rename = "neutral_sentiments")]
    pub neutral: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopFeedRow {
    pub title: String,
    pub published: DateTime<Utc>,
    pub source_name: String,
    pub sentiment_value: f64,
    pub sentiment_compound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasRow {
    pub source_name: String,
    pub keyword: String,
    pub mention_count: i64,
    pub net_sentiment_score: f64,
    pub sentiment_std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRow {
    pub source_name: String,
    /// First day of the month, `YYYY-MM-DD`.
    pub month: String,
    pub avg_compound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoOccurrenceRow {
    pub co_word: String,
    pub co_occurrence: i64,
    pub positive_count: i64,
    pub negative_count: i64,
    pub neutral_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseFrequencyRow {
    pub source: String,
    pub phrase: String,
    pub year: i64,
    pub date_group: i64,
    pub frequency: i64,
    pub ranked: i64,
}

/// A source to poll during ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFeed {
    pub id: i64,
    pub rss: String,
    pub lang: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_parse() {
        let range = DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end_of_day().to_string(), "2024-01-31 23:59:59");
        assert_eq!(range.start_of_day().to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    fn test_date_range_errors() {
        assert_eq!(
            DateRange::parse(None, Some("2024-01-31")),
            Err(ValidationError::MissingDateRange)
        );
        assert_eq!(
            DateRange::parse(Some(" "), Some("2024-01-31")),
            Err(ValidationError::MissingDateRange)
        );
        assert_eq!(
            DateRange::parse(Some("2024-13-01"), Some("2024-01-31")),
            Err(ValidationError::InvalidDate { field: "start_date" })
        );
        assert_eq!(
            DateRange::parse(Some("2024-01-01"), Some("31/01/2024")),
            Err(ValidationError::InvalidDate { field: "end_date" })
        );
        assert_eq!(
            DateRange::parse(Some("2024-02-01"), Some("2024-01-31")),
            Err(ValidationError::InvertedDateRange)
        );
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::parse(Some("2024-06-01"), Some("2024-06-01")).unwrap();
        assert_eq!(range.start(), range.end());
    }

    #[test]
    fn test_sentiment_class_parse() {
        assert_eq!(SentimentClass::parse("Negative"), Some(SentimentClass::Negative));
        assert_eq!(SentimentClass::parse("none"), None);
        assert_eq!(SentimentClass::Neutral.to_string(), "neutral");
    }

    #[test]
    fn test_enum_params() {
        assert_eq!("DATE".parse::<GroupBy>().unwrap(), GroupBy::Date);
        assert!("region".parse::<GroupBy>().is_err());
        assert_eq!("week".parse::<DateGroup>().unwrap(), DateGroup::Week);
        assert_eq!(DateGroup::default().as_str(), "month");
    }

    #[test]
    fn test_series_json_keys() {
        let series = SeriesResult {
            negative: vec![1],
            neutral: vec![0],
            positive: vec![3],
            keys: vec!["1".to_string()],
        };
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"Negative": [1], "Neutral": [0], "Positive": [3], "keys": ["1"]})
        );
    }

    #[test]
    fn test_counts_json_keys() {
        let json = serde_json::to_value(SentimentCounts {
            positive: 2,
            negative: 1,
            neutral: 0,
        })
        .unwrap();
        assert_eq!(json["positive_sentiments"], 2);
        assert_eq!(json["negative_sentiments"], 1);
        assert_eq!(json["neutral_sentiments"], 0);
    }
}
