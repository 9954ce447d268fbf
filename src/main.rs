use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use pow_analytics::api::{self, AppState};
use pow_analytics::config::Config;
use pow_analytics::logging::configure_logging;
use pow_analytics::{Database, Repository, TARGET_DB};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    configure_logging(&config.log_dir);

    info!(
        "pow-analytics {} ({}, built {}) starting",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        env!("BUILD_TIMESTAMP")
    );

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_err() {
            error!("Failed to listen for ctrl-c");
        }
        let _ = cancel_tx.send(true);
    });

    let db = Database::connect(&config.database).await?;
    let repo = Repository::new(Arc::new(db.clone()));

    let state = AppState::new(repo, &config.server);
    let served = api::serve(state, config.server.port, cancel_rx).await;

    info!(target: TARGET_DB, "Closing database pool");
    db.close().await;

    served
}
