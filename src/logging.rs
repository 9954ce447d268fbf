use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const STDOUT_FILTER: &str = "info,db_query=warn,web_request=warn,classifier=info,sqlx=off";
const FILE_FILTER: &str = "info,db_query=debug,web_request=info,sqlx=info";

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Server logging: stdout plus a daily rolling file under `log_dir`.
pub fn configure_logging(log_dir: &str) {
    // feed-rs warns on every unknown extension element; not actionable.
    let custom_filter = FilterFn::new(|metadata| {
        !(metadata.level() == &Level::WARN && metadata.target().starts_with("feed_rs"))
    });

    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(env_filter_or(STDOUT_FILTER))
        .with_filter(custom_filter);

    let file_appender = rolling::daily(log_dir, "pow.log");
    let file_log = fmt::layer()
        .with_ansi(false)
        .with_writer(file_appender)
        .with_filter(EnvFilter::new(FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();
}

/// Stdout-only logging for command line tools.
pub fn setup_logging(name: &str, level: Level) {
    let filter = env_filter_or(&format!("{},{}={}", level, name.replace('-', "_"), level));

    tracing_subscriber::Registry::default()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}
