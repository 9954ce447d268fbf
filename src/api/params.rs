//! Query-string parameters shared by the `/pow/*` endpoints.
//!
//! Every field is taken as raw text and interpreted leniently here: numeric
//! knobs fall back to their defaults, unknown `pos_neg` values fall back to
//! `positive`, and `sources` entries that are not integers are dropped. Only
//! the date range, keywords and the `group_by`/`date_group` choices can reject
//! a request.

use serde::Deserialize;

use crate::aggregate::top_n_or_default;
use crate::error::ValidationError;
use crate::models::{DateGroup, DateRange, GroupBy, SentimentClass};

pub const DEFAULT_TOP_FEEDS: u32 = 5;
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 30;

#[derive(Debug, Default, Deserialize)]
pub struct PowParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub sources: Option<String>,
    pub free_text: Option<String>,
    pub group_by: Option<String>,
    pub pos_neg: Option<String>,
    pub limit: Option<String>,
    pub words: Option<String>,
    pub word: Option<String>,
    pub page: Option<String>,
    pub items_per_page: Option<String>,
    pub nm_common: Option<String>,
    pub date_group: Option<String>,
    pub names_excluded: Option<String>,
}

impl PowParams {
    pub fn date_range(&self) -> Result<DateRange, ValidationError> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }

    pub fn sources(&self) -> Vec<i64> {
        parse_sources(self.sources.as_deref())
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn group_by(&self) -> Result<GroupBy, ValidationError> {
        match non_blank(&self.group_by) {
            Some(value) => value.parse(),
            None => Ok(GroupBy::default()),
        }
    }

    pub fn date_group(&self) -> Result<DateGroup, ValidationError> {
        match non_blank(&self.date_group) {
            Some(value) => value.parse(),
            None => Ok(DateGroup::default()),
        }
    }

    pub fn sentiment_class(&self) -> SentimentClass {
        self.pos_neg
            .as_deref()
            .and_then(SentimentClass::parse)
            .unwrap_or(SentimentClass::Positive)
    }

    pub fn limit(&self) -> u32 {
        positive_or(&self.limit, DEFAULT_TOP_FEEDS)
    }

    pub fn page(&self) -> u32 {
        positive_or(&self.page, DEFAULT_PAGE)
    }

    pub fn items_per_page(&self) -> u32 {
        positive_or(&self.items_per_page, DEFAULT_ITEMS_PER_PAGE)
    }

    pub fn top_n(&self) -> usize {
        top_n_or_default(self.nm_common.as_deref())
    }

    pub fn names_excluded(&self) -> bool {
        matches!(
            non_blank(&self.names_excluded).map(str::to_lowercase).as_deref(),
            Some("true" | "1" | "yes")
        )
    }

    /// Comma-separated keyword list for bias detection; sanitized later.
    pub fn keywords(&self) -> Vec<String> {
        self.words
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(String::from)
            .collect()
    }

    /// Single keyword; `word` wins over `words`.
    pub fn keyword(&self) -> Result<&str, ValidationError> {
        non_blank(&self.word)
            .or_else(|| non_blank(&self.words))
            .ok_or(ValidationError::MissingParameter("word"))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn positive_or(value: &Option<String>, default: u32) -> u32 {
    non_blank(value)
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Comma-separated source ids; entries that are not integers are dropped.
pub fn parse_sources(raw: Option<&str>) -> Vec<i64> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}
