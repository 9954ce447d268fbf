use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, StreamExt};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row as SqlxRow, TypeInfo, ValueRef};
use tracing::{debug, info, instrument};

use super::executor::{Cell, QueryExecutor, Row};
use crate::config::DatabaseConfig;
use crate::error::QueryError;
use crate::query::{BuiltQuery, QueryArg};
use crate::TARGET_DB;

/// Postgres connection pool, shared by every request.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Get access to the database pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Database { pool }
    }

    #[instrument(target = "db_query", level = "info", skip(config))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!(
            target: TARGET_DB,
            "Creating database pool (max {} connections, max lifetime {:?})",
            config.max_connections,
            config.max_lifetime
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        info!(target: TARGET_DB, "Database pool created");

        Ok(Database { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!(target: TARGET_DB, "Database pool closed");
    }
}

fn bind_args(query: &BuiltQuery) -> Query<'_, Postgres, PgArguments> {
    let mut bound = sqlx::query(query.sql());
    for arg in query.args() {
        bound = match arg {
            QueryArg::Text(v) => bound.bind(v.as_str()),
            QueryArg::Int(v) => bound.bind(*v),
            QueryArg::Bool(v) => bound.bind(*v),
            QueryArg::Date(v) => bound.bind(*v),
            QueryArg::Timestamp(v) => bound.bind(*v),
            QueryArg::IntArray(v) => bound.bind(v.as_slice()),
            QueryArg::TextArray(v) => bound.bind(v.as_slice()),
        };
    }
    bound
}

/// Decode every column by its Postgres type name.
fn decode_pg_row(row: &PgRow) -> Result<Row, QueryError> {
    let mut cells = Vec::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(i)?.is_null() {
            cells.push(Cell::Null);
            continue;
        }

        let cell = match column.type_info().name() {
            "BOOL" => Cell::Bool(row.try_get(i)?),
            "INT2" => Cell::Int(row.try_get::<i16, _>(i)?.into()),
            "INT4" => Cell::Int(row.try_get::<i32, _>(i)?.into()),
            "INT8" => Cell::Int(row.try_get(i)?),
            "FLOAT4" => Cell::Float(row.try_get::<f32, _>(i)?.into()),
            "FLOAT8" => Cell::Float(row.try_get(i)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Cell::Text(row.try_get(i)?),
            "DATE" => Cell::Date(row.try_get::<NaiveDate, _>(i)?),
            "TIMESTAMPTZ" => Cell::Timestamp(row.try_get::<DateTime<Utc>, _>(i)?),
            "TIMESTAMP" => Cell::Timestamp(row.try_get::<NaiveDateTime, _>(i)?.and_utc()),
            "TEXT[]" | "VARCHAR[]" => Cell::TextArray(row.try_get::<Vec<Option<String>>, _>(i)?),
            other => {
                return Err(QueryError::UnsupportedColumn {
                    column: i,
                    type_name: other.to_string(),
                })
            }
        };
        cells.push(cell);
    }

    Ok(Row::new(cells))
}

impl QueryExecutor for Database {
    fn fetch<'a>(&'a self, query: &'a BuiltQuery) -> BoxStream<'a, Result<Row, QueryError>> {
        debug!(target: TARGET_DB, args = query.args().len(), "fetch: {}", query.sql());
        bind_args(query)
            .fetch(&self.pool)
            .map(|row| decode_pg_row(&row?))
            .boxed()
    }

    fn fetch_scalar<'a>(&'a self, query: &'a BuiltQuery) -> BoxFuture<'a, Result<Cell, QueryError>> {
        debug!(target: TARGET_DB, args = query.args().len(), "fetch_scalar: {}", query.sql());
        async move {
            let row = bind_args(query).fetch_one(&self.pool).await?;
            decode_pg_row(&row)?.into_cell(0)
        }
        .boxed()
    }
}
