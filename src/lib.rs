pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod repository;
pub mod rss;
pub mod sentiment;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_CLASSIFIER: &str = "classifier";
pub const TARGET_DB: &str = "db_query";

/// Sentiment model whose scores every analytical query reports on.
///
/// The SQL templates in [`query::sql`] splice this value in at compile time;
/// a unit test there keeps the two in sync.
pub const PRODUCTION_MODEL_ID: i32 = 1;

pub use crate::db::{Cancellation, Database, QueryExecutor};
pub use crate::error::{AnalyticsError, QueryError, ValidationError};
pub use crate::repository::Repository;
