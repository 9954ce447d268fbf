use tracing::instrument;

use super::Repository;
use crate::aggregate::pivot_series;
use crate::db::{Cancellation, Row};
use crate::error::{AnalyticsResult, QueryError};
use crate::models::{
    DateRange, GroupBy, GroupedCount, SentimentClass, SentimentCounts, SeriesResult, TopFeedRow,
};
use crate::query::{sql, Filters, QueryArg, SqlBuilder};

impl Repository {
    /// Raw (group key, class, count) rows for the chosen grouping dimension.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn sentiment_grouped_rows(
        &self,
        range: &DateRange,
        free_text: Option<&str>,
        group_by: GroupBy,
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<GroupedCount>> {
        let base = match group_by {
            GroupBy::Source => sql::SENTIMENT_BY_SOURCE_HEAD,
            GroupBy::Date => sql::SENTIMENT_BY_DATE_HEAD,
        };
        let mut builder = SqlBuilder::dated(base, range.start(), range.end());
        builder
            .push_filters(&Filters::default().with_free_text(free_text))
            .push(sql::SENTIMENT_GROUPED_TAIL);

        let rows = self
            .collect("sentiment grouped", &builder.build(), cancel, |row| {
                Ok(GroupedCount {
                    group_by: row.text(0)?,
                    sentiment_key: row.text(1)?,
                    count: row.int(2)?,
                })
            })
            .await?;
        Ok(rows)
    }

    /// Grouped sentiment counts pivoted into aligned series.
    pub async fn sentiment_grouped(
        &self,
        range: &DateRange,
        free_text: Option<&str>,
        group_by: GroupBy,
        cancel: &Cancellation,
    ) -> AnalyticsResult<SeriesResult> {
        let rows = self
            .sentiment_grouped_rows(range, free_text, group_by, cancel)
            .await?;
        Ok(pivot_series(&rows))
    }

    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn count_sentiments(
        &self,
        range: &DateRange,
        cancel: &Cancellation,
    ) -> AnalyticsResult<SentimentCounts> {
        let query = SqlBuilder::dated(sql::COUNT_SENTIMENTS, range.start(), range.end()).build();
        let rows = self
            .collect("count sentiments", &query, cancel, decode_counts)
            .await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Highest-magnitude feeds of one class, at most `limit` of them.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn top_feeds(
        &self,
        range: &DateRange,
        class: SentimentClass,
        limit: u32,
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<TopFeedRow>> {
        let mut builder = SqlBuilder::dated(sql::TOP_FEEDS, range.start(), range.end());
        builder.bind(QueryArg::Text(class.as_str().to_string()));
        builder.bind(QueryArg::Int(i64::from(limit.max(1))));

        let rows = self
            .collect("top feeds", &builder.build(), cancel, |row| {
                Ok(TopFeedRow {
                    title: row.text(0)?,
                    published: row.timestamp(1)?,
                    source_name: row.text(2)?,
                    sentiment_value: row.opt_float(3)?.unwrap_or(0.0),
                    sentiment_compound: row.opt_float(4)?.unwrap_or(0.0),
                })
            })
            .await?;
        Ok(rows)
    }
}

fn decode_counts(row: Row) -> Result<SentimentCounts, QueryError> {
    Ok(SentimentCounts {
        positive: row.opt_int(0)?.unwrap_or(0),
        negative: row.opt_int(1)?.unwrap_or(0),
        neutral: row.opt_int(2)?.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Cell;
    use crate::error::AnalyticsError;
    use crate::repository::testing::{text, Scripted, ScriptedExecutor};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use tokio::sync::watch;

    fn range() -> DateRange {
        DateRange::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap()
    }

    fn grouped(key: &str, class: &str, count: i64) -> Row {
        Row::new(vec![text(key), text(class), Cell::Int(count)])
    }

    #[tokio::test]
    async fn test_grouped_by_source_is_pivoted() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Rows(vec![
            grouped("1", "negative", 1),
            grouped("1", "positive", 3),
            grouped("2", "negative", 2),
            grouped("2", "none", 8),
        ])]));
        let repo = Repository::new(executor.clone());

        let series = repo
            .sentiment_grouped(&range(), None, GroupBy::Source, &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(series.keys, vec!["1", "2"]);
        assert_eq!(series.positive, vec![3, 0]);
        assert_eq!(series.negative, vec![1, 2]);
        assert_eq!(series.neutral, vec![0, 0]);

        let query = &executor.issued()[0];
        assert!(query.sql().contains("f.source_id::text AS group_by"));
        assert_eq!(query.args().len(), 2);
    }

    #[tokio::test]
    async fn test_grouped_by_date_with_free_text() {
        let executor = Arc::new(ScriptedExecutor::default());
        let repo = Repository::new(executor.clone());

        let series = repo
            .sentiment_grouped(&range(), Some("választás"), GroupBy::Date, &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(series, SeriesResult::default());

        let query = &executor.issued()[0];
        assert!(query.sql().contains("to_char(f.feed_date, 'YYYY-MM-DD')"));
        assert!(query.sql().contains("ILIKE '%' || $3 || '%' GROUP BY"));
        assert_eq!(query.args()[2], QueryArg::Text("választás".to_string()));
    }

    #[tokio::test]
    async fn test_counts_default_to_zero() {
        let executor = Arc::new(ScriptedExecutor::default());
        let repo = Repository::new(executor);
        let counts = repo
            .count_sentiments(&range(), &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(counts, SentimentCounts::default());
    }

    #[tokio::test]
    async fn test_counts_decoded_in_order() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Rows(vec![Row::new(
            vec![Cell::Int(12), Cell::Int(7), Cell::Null],
        )])]));
        let repo = Repository::new(executor);
        let counts = repo
            .count_sentiments(&range(), &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(
            counts,
            SentimentCounts {
                positive: 12,
                negative: 7,
                neutral: 0
            }
        );
    }

    #[tokio::test]
    async fn test_top_feeds_binds_class_and_limit() {
        let published = Utc.with_ymd_and_hms(2024, 1, 9, 8, 30, 0).unwrap();
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Rows(vec![Row::new(
            vec![
                text("Rekordot döntött a forint"),
                Cell::Timestamp(published),
                text("Index"),
                Cell::Float(0.97),
                Cell::Float(0.8),
            ],
        )])]));
        let repo = Repository::new(executor.clone());

        let rows = repo
            .top_feeds(&range(), SentimentClass::Negative, 3, &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_name, "Index");
        assert_eq!(rows[0].published, published);

        let query = &executor.issued()[0];
        assert!(query.sql().contains("f.feed_date BETWEEN $1 AND $2"));
        assert!(!query.sql().contains("f.published BETWEEN"));
        assert!(query.sql().contains("fs.sentiment_value::double precision"));
        assert_eq!(query.args()[0], QueryArg::Date(range().start()));
        assert_eq!(query.args()[1], QueryArg::Date(range().end()));
        assert_eq!(query.args()[2], QueryArg::Text("negative".to_string()));
        assert_eq!(query.args()[3], QueryArg::Int(3));
    }

    #[tokio::test]
    async fn test_cancelled_query_propagates() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Pending]));
        let repo = Repository::new(executor);
        let (tx, rx) = watch::channel(false);
        let cancel = crate::db::Cancellation::from_signal(rx);

        let range = range();
        let pending = repo.count_sentiments(&range, &cancel);
        tx.send(true).unwrap();
        let err = pending.await.unwrap_err();
        assert!(matches!(err, AnalyticsError::Query(QueryError::Cancelled)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_query_error() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Error]));
        let repo = Repository::new(executor);
        let err = repo
            .sentiment_grouped(&range(), None, GroupBy::Source, &Cancellation::none())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Query(QueryError::Database(_))));
    }
}
