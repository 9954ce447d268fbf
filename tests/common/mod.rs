//! In-memory storage for HTTP tests: canned responses served in call order.

#![allow(dead_code)]

use axum::body::{self, Body};
use axum::http::{Request, Response};
use axum::Router;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pow_analytics::api::{self, AppState};
use pow_analytics::config::ServerConfig;
use pow_analytics::db::{Cell, QueryExecutor, Row};
use pow_analytics::query::BuiltQuery;
use pow_analytics::{QueryError, Repository};

const BODY_LIMIT: usize = 1024 * 1024;

pub enum Canned {
    Rows(Vec<Row>),
    Fail,
    Hang,
}

#[derive(Default)]
pub struct CannedExecutor {
    responses: Mutex<VecDeque<Canned>>,
    issued: Mutex<Vec<BuiltQuery>>,
}

impl CannedExecutor {
    pub fn new(responses: Vec<Canned>) -> Arc<Self> {
        Arc::new(CannedExecutor {
            responses: Mutex::new(responses.into()),
            issued: Mutex::new(Vec::new()),
        })
    }

    pub fn issued(&self) -> Vec<BuiltQuery> {
        self.issued.lock().unwrap().clone()
    }

    fn next(&self, query: &BuiltQuery) -> Canned {
        self.issued.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Canned::Rows(Vec::new()))
    }
}

fn failure() -> QueryError {
    QueryError::Database(sqlx::Error::Protocol("connection refused".to_string()))
}

impl QueryExecutor for CannedExecutor {
    fn fetch<'a>(&'a self, query: &'a BuiltQuery) -> BoxStream<'a, Result<Row, QueryError>> {
        match self.next(query) {
            Canned::Rows(rows) => stream::iter(rows.into_iter().map(Ok)).boxed(),
            Canned::Fail => stream::once(async { Err(failure()) }).boxed(),
            Canned::Hang => stream::pending().boxed(),
        }
    }

    fn fetch_scalar<'a>(&'a self, query: &'a BuiltQuery) -> BoxFuture<'a, Result<Cell, QueryError>> {
        match self.next(query) {
            Canned::Rows(rows) => {
                let cell = rows
                    .into_iter()
                    .next()
                    .map(|row| row.into_cell(0))
                    .unwrap_or(Ok(Cell::Null));
                future::ready(cell).boxed()
            }
            Canned::Fail => future::ready(Err(failure())).boxed(),
            Canned::Hang => future::pending().boxed(),
        }
    }
}

pub fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        query_timeout: Duration::from_secs(5),
        cors_allowed_origins: vec!["https://pow.example".to_string()],
        ..ServerConfig::default()
    }
}

/// Build the same Router the binary uses, over canned storage.
pub fn test_router(executor: Arc<CannedExecutor>, config: &ServerConfig) -> Router {
    let state = AppState::new(Repository::new(executor), config);
    api::router(state)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request")
}

pub async fn json_body(resp: Response<Body>) -> serde_json::Value {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn text_body(resp: Response<Body>) -> String {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}
