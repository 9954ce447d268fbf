//! HTTP interface: read-only `/pow/*` analytics endpoints over the repository.

mod auth;
mod handlers;
mod params;
mod response;

use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

pub use self::auth::{Claims, JwtValidator};
pub use self::params::{parse_sources, PowParams, DEFAULT_ITEMS_PER_PAGE, DEFAULT_TOP_FEEDS};
pub use self::response::ApiError;

use crate::config::ServerConfig;
use crate::db::Cancellation;
use crate::repository::Repository;
use crate::TARGET_WEB_REQUEST;

#[derive(Clone)]
pub struct AppState {
    repo: Repository,
    query_timeout: Duration,
    auth: Option<Arc<JwtValidator>>,
    cors_origins: Arc<Vec<String>>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl AppState {
    pub fn new(repo: Repository, config: &ServerConfig) -> Self {
        AppState {
            repo,
            query_timeout: config.query_timeout,
            auth: JwtValidator::from_config(&config.auth).map(Arc::new),
            cors_origins: Arc::new(config.cors_allowed_origins.clone()),
            shutdown: None,
        }
    }

    /// In-flight queries are cancelled once `shutdown` flips to `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }

    /// Per-request signal: the configured deadline plus server shutdown.
    fn cancellation(&self) -> Cancellation {
        let base = match &self.shutdown {
            Some(rx) => Cancellation::from_signal(rx.clone()),
            None => Cancellation::none(),
        };
        base.and_timeout(self.query_timeout)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(target: TARGET_WEB_REQUEST, "Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}

/// Build the router the server binary uses.
pub fn router(state: AppState) -> Router {
    let pow = Router::new()
        .route("/pow/feeds", get(handlers::feeds))
        .route("/pow/most_common_words", get(handlers::most_common_words))
        .route("/pow/get_sentiment_grouped", get(handlers::sentiment_grouped))
        .route("/pow/count_sentiments", get(handlers::count_sentiments))
        .route("/pow/top_feeds", get(handlers::top_feeds))
        .route("/pow/bias_detection", get(handlers::bias_detection))
        .route(
            "/pow/correlation_between_sources_avg_compound",
            get(handlers::correlation),
        )
        .route("/pow/word_co_occurences", get(handlers::word_co_occurrences))
        .route(
            "/pow/phrase_frequency_trends",
            get(handlers::phrase_frequency_trends),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(pow)
        .layer(cors_layer(&state.cors_origins))
        .with_state(state)
}

/// Serve until `shutdown` flips to `true`, then drain in-flight requests.
pub async fn serve(state: AppState, port: u16, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(
        target: TARGET_WEB_REQUEST,
        "Server running on http://{} (auth {})",
        addr,
        if state.auth_enabled() { "enabled" } else { "disabled" }
    );

    let app = router(state.with_shutdown(shutdown.clone()));
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow_and_update() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            info!(target: TARGET_WEB_REQUEST, "Shutting down HTTP server");
        })
        .await?;

    Ok(())
}
