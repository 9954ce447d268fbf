//! Parameterized SQL assembly.
//!
//! Only `&'static str` fragments ever reach the query text. Every
//! caller-controlled value is bound as a positional argument, and `bind`
//! hands back the `$n` index it consumed so fragments can reference it.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

/// A bound query argument.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArg {
    Text(String),
    Int(i64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    IntArray(Vec<i64>),
    TextArray(Vec<String>),
}

impl From<NaiveDate> for QueryArg {
    fn from(v: NaiveDate) -> Self {
        QueryArg::Date(v)
    }
}

impl From<NaiveDateTime> for QueryArg {
    fn from(v: NaiveDateTime) -> Self {
        QueryArg::Timestamp(v)
    }
}

impl From<i64> for QueryArg {
    fn from(v: i64) -> Self {
        QueryArg::Int(v)
    }
}

impl From<&str> for QueryArg {
    fn from(v: &str) -> Self {
        QueryArg::Text(v.to_string())
    }
}

impl From<String> for QueryArg {
    fn from(v: String) -> Self {
        QueryArg::Text(v)
    }
}

/// Final query text plus its arguments, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    sql: String,
    args: Vec<QueryArg>,
}

impl BuiltQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[QueryArg] {
        &self.args
    }

    /// Distinct `$n` indices referenced by the text.
    pub fn placeholders(&self) -> BTreeSet<usize> {
        placeholders_in(&self.sql)
    }
}

fn placeholders_in(sql: &str) -> BTreeSet<usize> {
    let bytes = sql.as_bytes();
    let mut found = BTreeSet::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                if let Ok(n) = sql[start..end].parse() {
                    found.insert(n);
                }
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    found
}

/// Optional predicates shared by the analytical queries.
///
/// Applied by [`SqlBuilder::push_filters`] in field order. Empty values add
/// neither text nor arguments, so an empty source list behaves exactly like
/// no source filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub keyword: Option<String>,
    pub sources: Vec<i64>,
    pub free_text: Option<String>,
    pub excluded_phrases: Vec<String>,
}

impl Filters {
    pub fn sources(sources: &[i64]) -> Self {
        Filters {
            sources: sources.to_vec(),
            ..Default::default()
        }
    }

    pub fn with_free_text(mut self, free_text: Option<&str>) -> Self {
        self.free_text = free_text.map(str::to_string);
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = Some(keyword.to_string());
        self
    }

    pub fn with_excluded_phrases(mut self, phrases: &[&str]) -> Self {
        self.excluded_phrases = phrases.iter().map(|p| p.to_string()).collect();
        self
    }
}

const KEYWORD_PREDICATE: &str =
    " AND f.search_vector @@ to_tsquery('hungarian', {} || ':*')";
const SOURCES_PREDICATE: &str = " AND f.source_id = ANY({})";
const FREE_TEXT_PREDICATE: &str = " AND f.title ILIKE '%' || {} || '%'";
const EXCLUDED_PHRASES_PREDICATE: &str = " AND phrase <> ALL({}::text[])";

#[derive(Debug, Default)]
pub struct SqlBuilder {
    sql: String,
    args: Vec<QueryArg>,
}

impl SqlBuilder {
    pub fn new(base: &'static str) -> Self {
        SqlBuilder {
            sql: base.to_string(),
            args: Vec::new(),
        }
    }

    /// Start from `base` with the date range bound as `$1` and `$2`.
    pub fn dated(
        base: &'static str,
        start: impl Into<QueryArg>,
        end: impl Into<QueryArg>,
    ) -> Self {
        let mut builder = Self::new(base);
        builder.bind(start.into());
        builder.bind(end.into());
        builder
    }

    /// Bind a value and return its 1-based placeholder index.
    pub fn bind(&mut self, arg: QueryArg) -> usize {
        self.args.push(arg);
        self.args.len()
    }

    pub fn push(&mut self, fragment: &'static str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    /// Append `template` with its single `{}` replaced by the placeholder
    /// for `arg`.
    pub fn push_bound(&mut self, template: &'static str, arg: QueryArg) -> &mut Self {
        let index = self.bind(arg);
        match template.split_once("{}") {
            Some((head, tail)) => {
                self.sql.push_str(head);
                self.sql.push('$');
                self.sql.push_str(&index.to_string());
                self.sql.push_str(tail);
            }
            None => self.sql.push_str(template),
        }
        self
    }

    pub fn push_filters(&mut self, filters: &Filters) -> &mut Self {
        if let Some(keyword) = non_empty(filters.keyword.as_deref()) {
            self.push_bound(KEYWORD_PREDICATE, QueryArg::Text(keyword.to_string()));
        }
        if !filters.sources.is_empty() {
            self.push_bound(SOURCES_PREDICATE, QueryArg::IntArray(filters.sources.clone()));
        }
        if let Some(text) = non_empty(filters.free_text.as_deref()) {
            self.push_bound(FREE_TEXT_PREDICATE, QueryArg::Text(text.to_string()));
        }
        if !filters.excluded_phrases.is_empty() {
            self.push_bound(
                EXCLUDED_PHRASES_PREDICATE,
                QueryArg::TextArray(filters.excluded_phrases.clone()),
            );
        }
        self
    }

    /// Number of arguments bound so far.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn build(self) -> BuiltQuery {
        let query = BuiltQuery {
            sql: self.sql,
            args: self.args,
        };
        debug_assert_eq!(
            query.placeholders(),
            (1..=query.args.len()).collect::<BTreeSet<_>>(),
            "placeholders out of step with bound arguments: {}",
            query.sql
        );
        query
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
