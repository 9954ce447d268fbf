//! Analytical read operations over the feed store.
//!
//! Each operation builds its query, runs it through the injected
//! [`QueryExecutor`] under the caller's [`Cancellation`], and decodes rows
//! into the response records. Nothing is retried; the first failure wins and
//! no partial result is returned.

mod feeds;
mod keywords;
mod sentiment;
mod sources;
mod trends;
mod words;

use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, warn};

use crate::db::{Cancellation, Cell, QueryExecutor, Row};
use crate::error::QueryError;
use crate::query::BuiltQuery;
use crate::TARGET_DB;

#[derive(Clone)]
pub struct Repository {
    executor: Arc<dyn QueryExecutor>,
}

impl Repository {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Repository { executor }
    }

    pub fn executor(&self) -> &Arc<dyn QueryExecutor> {
        &self.executor
    }

    /// Stream rows into `visit` until exhausted, cancelled, or failed.
    async fn for_each_row<F>(
        &self,
        operation: &'static str,
        query: &BuiltQuery,
        cancel: &Cancellation,
        mut visit: F,
    ) -> Result<(), QueryError>
    where
        F: FnMut(Row) -> Result<(), QueryError>,
    {
        let work = async {
            let mut rows = self.executor.fetch(query);
            while let Some(row) = rows.next().await {
                visit(row?)?;
            }
            Ok(())
        };
        cancel
            .run(work)
            .await
            .map_err(|e| log_failure(operation, e))
    }

    async fn collect<T, F>(
        &self,
        operation: &'static str,
        query: &BuiltQuery,
        cancel: &Cancellation,
        decode: F,
    ) -> Result<Vec<T>, QueryError>
    where
        F: Fn(Row) -> Result<T, QueryError>,
    {
        let mut out = Vec::new();
        self.for_each_row(operation, query, cancel, |row| {
            out.push(decode(row)?);
            Ok(())
        })
        .await?;
        Ok(out)
    }

    async fn scalar(
        &self,
        operation: &'static str,
        query: &BuiltQuery,
        cancel: &Cancellation,
    ) -> Result<Cell, QueryError> {
        cancel
            .run(self.executor.fetch_scalar(query))
            .await
            .map_err(|e| log_failure(operation, e))
    }
}

fn log_failure(operation: &'static str, err: QueryError) -> QueryError {
    if err.is_cancellation() {
        warn!(target: TARGET_DB, "{} aborted: {}", operation, err);
    } else {
        error!(target: TARGET_DB, "{} failed: {}", operation, err);
    }
    err
}
