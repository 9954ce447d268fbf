use tracing::instrument;

use super::Repository;
use crate::aggregate::stopwords::{HUNGARIAN_STOPWORDS, PUBLIC_FIGURE_PHRASES};
use crate::db::Cancellation;
use crate::error::AnalyticsResult;
use crate::models::{DateGroup, DateRange, PhraseFrequencyRow};
use crate::query::{sql, Filters, QueryArg, SqlBuilder};

impl Repository {
    /// Top ten two-word phrases per (source, year, week or month).
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn phrase_frequency_trends(
        &self,
        range: &DateRange,
        date_group: DateGroup,
        sources: &[i64],
        names_excluded: bool,
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<PhraseFrequencyRow>> {
        let mut builder = SqlBuilder::dated(
            sql::PHRASE_TRENDS_HEAD,
            range.start_of_day(),
            range.end_of_day(),
        );
        builder.bind(QueryArg::Text(date_group.as_str().to_string()));
        builder.bind(QueryArg::TextArray(
            HUNGARIAN_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        ));
        builder
            .push_filters(&Filters::sources(sources))
            .push(sql::PHRASE_TRENDS_COUNT);
        if names_excluded {
            builder.push_filters(&Filters::default().with_excluded_phrases(PUBLIC_FIGURE_PHRASES));
        }
        builder.push(sql::PHRASE_TRENDS_TAIL);

        let rows = self
            .collect("phrase frequency trends", &builder.build(), cancel, |row| {
                Ok(PhraseFrequencyRow {
                    source: row.text(0)?,
                    phrase: row.text(1)?,
                    year: row.int(2)?,
                    date_group: row.int(3)?,
                    frequency: row.int(4)?,
                    ranked: row.int(5)?,
                })
            })
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Cell, Row};
    use crate::repository::testing::{text, Scripted, ScriptedExecutor};
    use std::sync::Arc;

    fn range() -> DateRange {
        DateRange::parse(Some("2024-01-01"), Some("2024-03-31")).unwrap()
    }

    #[tokio::test]
    async fn test_rows_decoded() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Rows(vec![Row::new(
            vec![
                text("444"),
                text("magyar nemzeti"),
                Cell::Int(2024),
                Cell::Int(2),
                Cell::Int(17),
                Cell::Int(1),
            ],
        )])]));
        let repo = Repository::new(executor);

        let rows = repo
            .phrase_frequency_trends(&range(), DateGroup::Month, &[], false, &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![PhraseFrequencyRow {
                source: "444".to_string(),
                phrase: "magyar nemzeti".to_string(),
                year: 2024,
                date_group: 2,
                frequency: 17,
                ranked: 1,
            }]
        );
    }

    #[tokio::test]
    async fn test_date_group_and_exclusions_are_bound() {
        let executor = Arc::new(ScriptedExecutor::default());
        let repo = Repository::new(executor.clone());

        repo.phrase_frequency_trends(&range(), DateGroup::Week, &[4], true, &Cancellation::none())
            .await
            .unwrap();

        let query = &executor.issued()[0];
        assert_eq!(query.args()[2], QueryArg::Text("week".to_string()));
        assert_eq!(query.args()[4], QueryArg::IntArray(vec![4]));
        match &query.args()[5] {
            QueryArg::TextArray(phrases) => {
                assert!(phrases.contains(&"orbán viktor".to_string()))
            }
            other => panic!("expected phrase list, got {:?}", other),
        }
        assert!(query.sql().contains("phrase <> ALL($6::text[])"));
        assert!(query.sql().contains("ranked <= 10"));
    }

    #[tokio::test]
    async fn test_names_kept_by_default() {
        let executor = Arc::new(ScriptedExecutor::default());
        let repo = Repository::new(executor.clone());

        repo.phrase_frequency_trends(&range(), DateGroup::Month, &[], false, &Cancellation::none())
            .await
            .unwrap();

        let query = &executor.issued()[0];
        assert_eq!(query.args().len(), 4);
        assert!(!query.sql().contains("phrase <> ALL"));
    }
}
