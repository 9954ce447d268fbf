use chrono::Datelike;
use tracing::instrument;

use super::Repository;
use crate::aggregate::stopwords::HUNGARIAN_STOPWORDS;
use crate::db::{Cancellation, Row};
use crate::error::{AnalyticsResult, QueryError};
use crate::models::{BiasRow, CoOccurrenceRow, CorrelationRow, DateRange};
use crate::query::{sanitize_keyword, sanitize_keywords, sql, Filters, QueryArg, SqlBuilder};

impl Repository {
    /// Per (source, keyword) mention count and sentiment skew.
    ///
    /// Every keyword is sanitized first; an empty or invalid list is rejected
    /// before any query runs.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn bias_detection(
        &self,
        range: &DateRange,
        keywords: &[String],
        sources: &[i64],
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<BiasRow>> {
        let keywords = sanitize_keywords(keywords)?;

        let mut builder = SqlBuilder::dated(
            sql::BIAS_DETECTION_HEAD,
            range.start_of_day(),
            range.end_of_day(),
        );
        builder.bind(QueryArg::TextArray(keywords));
        builder
            .push_filters(&Filters::sources(sources))
            .push(sql::BIAS_DETECTION_TAIL);

        let rows = self
            .collect("bias detection", &builder.build(), cancel, decode_bias)
            .await?;
        Ok(rows)
    }

    /// Monthly average compound score per source for feeds matching `keyword`.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn correlation(
        &self,
        range: &DateRange,
        keyword: &str,
        sources: &[i64],
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<CorrelationRow>> {
        let keyword = sanitize_keyword(keyword)?;

        let mut builder =
            SqlBuilder::dated(sql::CORRELATION_HEAD, range.start_of_day(), range.end_of_day());
        builder
            .push_filters(&Filters::sources(sources).with_keyword(&keyword))
            .push(sql::CORRELATION_TAIL);

        let rows = self
            .collect("correlation", &builder.build(), cancel, decode_correlation)
            .await?;
        Ok(rows)
    }

    /// Words most often found in the same feed as `word`, at most 30.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn word_co_occurrences(
        &self,
        range: &DateRange,
        word: &str,
        sources: &[i64],
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<CoOccurrenceRow>> {
        let word = sanitize_keyword(word)?;

        let mut builder = SqlBuilder::dated(
            sql::CO_OCCURRENCE_HEAD,
            range.start_of_day(),
            range.end_of_day(),
        );
        builder.bind(QueryArg::Text(word));
        builder.bind(QueryArg::TextArray(
            HUNGARIAN_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        ));
        builder
            .push_filters(&Filters::sources(sources))
            .push(sql::CO_OCCURRENCE_TAIL);

        let rows = self
            .collect("word co-occurrences", &builder.build(), cancel, |row| {
                Ok(CoOccurrenceRow {
                    co_word: row.text(0)?,
                    co_occurrence: row.int(1)?,
                    positive_count: row.int(2)?,
                    negative_count: row.int(3)?,
                    neutral_count: row.int(4)?,
                })
            })
            .await?;
        Ok(rows)
    }
}

fn decode_bias(row: Row) -> Result<BiasRow, QueryError> {
    let mention_count = row.int(2)?;
    // Undefined ratio (no mentions) reports as zero.
    let net_sentiment_score = match mention_count {
        0 => 0.0,
        _ => row.opt_float(3)?.unwrap_or(0.0),
    };
    Ok(BiasRow {
        source_name: row.text(0)?,
        keyword: row.text(1)?,
        mention_count,
        net_sentiment_score,
        sentiment_std_dev: row.opt_float(4)?.unwrap_or(0.0),
    })
}

fn decode_correlation(row: Row) -> Result<CorrelationRow, QueryError> {
    let month = row.date(1)?;
    let first_of_month = month.with_day(1).unwrap_or(month);
    Ok(CorrelationRow {
        source_name: row.text(0)?,
        month: first_of_month.format("%Y-%m-%d").to_string(),
        avg_compound: row.opt_float(2)?.unwrap_or(0.0),
    })
}
