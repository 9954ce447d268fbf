use tracing::instrument;

use super::Repository;
use crate::aggregate::{Stopwords, WordCounter};
use crate::db::Cancellation;
use crate::error::AnalyticsResult;
use crate::models::{DateRange, WordCount};
use crate::query::{sql, SqlBuilder};

impl Repository {
    /// Most frequent non-stopword words in the range, streamed row by row.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn most_common_words(
        &self,
        range: &DateRange,
        n: usize,
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<WordCount>> {
        let query = SqlBuilder::dated(sql::WORDS_BY_DATE_RANGE, range.start(), range.end()).build();

        let mut counter = WordCounter::new(Stopwords::hungarian());
        self.for_each_row("most common words", &query, cancel, |row| {
            counter.add_words(row.into_text_array(0)?);
            Ok(())
        })
        .await?;

        Ok(counter.top(n))
    }
}
