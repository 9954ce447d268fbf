use tracing::{debug, instrument};

use super::Repository;
use crate::db::{Cancellation, Row};
use crate::error::{AnalyticsResult, QueryError};
use crate::models::{DateRange, Feed, FeedEntry, FeedPage, FeedSentiment, Source};
use crate::query::{sql, Filters, QueryArg, SqlBuilder};
use crate::TARGET_DB;

impl Repository {
    /// One page of feeds, newest first, with the total match count.
    ///
    /// A zero count returns an empty page without issuing the data query.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn feeds(
        &self,
        range: &DateRange,
        sources: &[i64],
        free_text: Option<&str>,
        page: u32,
        per_page: u32,
        cancel: &Cancellation,
    ) -> AnalyticsResult<FeedPage> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let filters = Filters::sources(sources).with_free_text(free_text);

        let mut count = SqlBuilder::dated(sql::FEEDS_COUNT_HEAD, range.start(), range.end());
        count.push_filters(&filters);
        let total = self
            .scalar("feeds count", &count.build(), cancel)
            .await?
            .into_count()?;

        if total == 0 {
            debug!(target: TARGET_DB, "No feeds match, skipping data query");
            return Ok(FeedPage::empty(page));
        }

        let offset = i64::from(page - 1) * i64::from(per_page);
        let mut data = SqlBuilder::dated(sql::FEEDS_PAGE_HEAD, range.start(), range.end());
        data.push_filters(&filters)
            .push(sql::FEEDS_PAGE_ORDER)
            .push_bound(sql::LIMIT, QueryArg::Int(i64::from(per_page)))
            .push_bound(sql::OFFSET, QueryArg::Int(offset));

        let feeds = self
            .collect("feeds", &data.build(), cancel, decode_feed_entry)
            .await?;

        Ok(FeedPage { total, page, feeds })
    }
}

fn decode_feed_entry(row: Row) -> Result<FeedEntry, QueryError> {
    Ok(FeedEntry {
        feed: Feed {
            id: row.int(0)?,
            title: row.text(1)?,
            link: row.opt_text(2)?,
            source_id: row.int(3)?,
            words: row.text_array(4)?.into_iter().flatten().collect(),
            published: row.timestamp(5)?,
            feed_date: row.date(6)?,
        },
        sentiment: FeedSentiment {
            id: row.int(7)?,
            sentiment_key: row.opt_text(8)?,
            sentiment_value: row.opt_float(9)?.unwrap_or(0.0),
            sentiment_compound: row.opt_float(10)?.unwrap_or(0.0),
        },
        source: Source {
            id: row.int(11)?,
            name: row.text(12)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Cell;
    use crate::error::AnalyticsError;
    use crate::repository::testing::{text, Scripted, ScriptedExecutor};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::Arc;

    fn range() -> DateRange {
        DateRange::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap()
    }

    fn feed_cells(id: i64) -> Vec<Cell> {
        vec![
            Cell::Int(id),
            text("Emelkedik az infláció"),
            text("https://hvg.hu/a"),
            Cell::Int(2),
            Cell::TextArray(vec![Some("emelkedik".to_string()), None]),
            Cell::Timestamp(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
            Cell::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
            Cell::Int(100 + id),
            text("negative"),
            Cell::Float(0.91),
            Cell::Float(-0.6),
            Cell::Int(2),
            text("HVG"),
        ]
    }

    fn feed_row(id: i64) -> Row {
        Row::new(feed_cells(id))
    }

    #[tokio::test]
    async fn test_zero_total_skips_data_query() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Rows(vec![
            Row::new(vec![Cell::Int(0)]),
        ])]));
        let repo = Repository::new(executor.clone());

        let page = repo
            .feeds(&range(), &[], None, 1, 30, &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(page, FeedPage::empty(1));
        assert_eq!(executor.issued().len(), 1);
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            serde_json::json!({"total": 0, "page": 1, "feeds": []})
        );
    }

    #[tokio::test]
    async fn test_page_offsets_and_decoding() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Scripted::Rows(vec![Row::new(vec![Cell::Int(45)])]),
            Scripted::Rows(vec![feed_row(1), feed_row(2)]),
        ]));
        let repo = Repository::new(executor.clone());

        let page = repo
            .feeds(&range(), &[2, 5], Some("infláció"), 3, 10, &Cancellation::none())
            .await
            .unwrap();

        assert_eq!(page.total, 45);
        assert_eq!(page.page, 3);
        assert_eq!(page.feeds.len(), 2);
        assert_eq!(page.feeds[0].feed.words, vec!["emelkedik".to_string()]);
        assert_eq!(page.feeds[1].sentiment.id, 102);
        assert_eq!(page.feeds[0].source.name, "HVG");

        let issued = executor.issued();
        assert_eq!(issued.len(), 2);
        let (count, data) = (&issued[0], &issued[1]);
        assert_eq!(count.args(), &data.args()[..4]);
        assert!(data.sql().ends_with("LIMIT $5 OFFSET $6"));
        assert_eq!(data.args()[4], QueryArg::Int(10));
        assert_eq!(data.args()[5], QueryArg::Int(20));
    }

    #[tokio::test]
    async fn test_empty_sources_match_no_filter() {
        let executor = Arc::new(ScriptedExecutor::default());
        let repo = Repository::new(executor.clone());
        let cancel = Cancellation::none();

        repo.feeds(&range(), &[], None, 1, 30, &cancel).await.unwrap();
        let without = executor.issued();

        let executor2 = Arc::new(ScriptedExecutor::default());
        let repo2 = Repository::new(executor2.clone());
        repo2.feeds(&range(), &[], Some(""), 1, 30, &cancel).await.unwrap();

        assert_eq!(without, executor2.issued());
        assert!(!without[0].sql().contains("ANY"));
    }

    #[tokio::test]
    async fn test_decode_failure_returns_no_partial_page() {
        let mut cells = feed_cells(3);
        cells[0] = text("not-an-id");
        let bad = Row::new(cells);
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Scripted::Rows(vec![Row::new(vec![Cell::Int(2)])]),
            Scripted::Rows(vec![feed_row(1), bad]),
        ]));
        let repo = Repository::new(executor);

        let err = repo
            .feeds(&range(), &[], None, 1, 30, &Cancellation::none())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::Query(QueryError::Decode { column: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_broken_stream_is_query_error() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Scripted::Rows(vec![Row::new(vec![Cell::Int(2)])]),
            Scripted::RowsThenError(vec![feed_row(1)]),
        ]));
        let repo = Repository::new(executor);

        let err = repo
            .feeds(&range(), &[], None, 1, 30, &Cancellation::none())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::Query(QueryError::Database(_))));
    }
}
