use tracing::instrument;

use super::Repository;
use crate::db::Cancellation;
use crate::error::AnalyticsResult;
use crate::models::SourceFeed;
use crate::query::{sql, QueryArg, SqlBuilder};

impl Repository {
    /// RSS sources registered for one language, in id order.
    #[instrument(level = "debug", skip(self, cancel))]
    pub async fn sources_by_language(
        &self,
        lang: &str,
        cancel: &Cancellation,
    ) -> AnalyticsResult<Vec<SourceFeed>> {
        let mut builder = SqlBuilder::new(sql::SOURCES_BY_LANGUAGE);
        builder.bind(QueryArg::Text(lang.to_string()));

        let rows = self
            .collect("sources by language", &builder.build(), cancel, |row| {
                Ok(SourceFeed {
                    id: row.int(0)?,
                    rss: row.text(1)?,
                    lang: row.text(2)?,
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

    #[tokio::test]
    async fn test_sources_for_language() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Scripted::Rows(vec![
            Row::new(vec![Cell::Int(1), text("https://telex.hu/rss"), text("hun")]),
            Row::new(vec![Cell::Int(4), text("https://hvg.hu/rss"), text("hun")]),
        ])]));
        let repo = Repository::new(executor.clone());

        let sources = repo
            .sources_by_language("hun", &Cancellation::none())
            .await
            .unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].rss, "https://hvg.hu/rss");
        assert_eq!(executor.issued()[0].args(), &[QueryArg::Text("hun".to_string())]);
    }
}
