//! Process configuration, read from the environment (and `.env` when present).

use anyhow::{anyhow, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty entries are dropped, so an unset variable yields an empty vector.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    split_list(&env::var(var).unwrap_or_default(), delimiter)
}

fn split_list(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_or<T: FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_opt(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts.
    pub fn from_env() -> Result<Self> {
        let url = match env_opt("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = env_opt("DB_HOST")
                    .ok_or_else(|| anyhow!("DATABASE_URL or DB_HOST must be set"))?;
                let name =
                    env_opt("DB_NAME").ok_or_else(|| anyhow!("DB_NAME must be set"))?;
                postgres_url(
                    &host,
                    &env_opt("DB_PORT").unwrap_or_else(|| "5432".to_string()),
                    &env_opt("DB_USER").unwrap_or_else(|| "postgres".to_string()),
                    &env::var("DB_PASSWORD").unwrap_or_default(),
                    &name,
                    &env_opt("DB_SSLMODE").unwrap_or_else(|| "require".to_string()),
                )?
            }
        };

        Ok(DatabaseConfig {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 0),
            idle_timeout: Duration::from_secs(env_or("DB_IDLE_TIMEOUT_SECS", 300)),
            max_lifetime: Duration::from_secs(env_or("DB_MAX_LIFETIME_SECS", 600)),
            acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 10)),
        })
    }
}

fn postgres_url(
    host: &str,
    port: &str,
    user: &str,
    password: &str,
    name: &str,
    sslmode: &str,
) -> Result<String> {
    let mut url = url::Url::parse("postgres://localhost")?;
    url.set_host(Some(host))?;
    url.set_port(Some(port.parse()?))
        .map_err(|_| anyhow!("invalid DB_PORT: {}", port))?;
    url.set_username(user)
        .map_err(|_| anyhow!("invalid DB_USER"))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| anyhow!("invalid DB_PASSWORD"))?;
    }
    url.set_path(name);
    url.query_pairs_mut().append_pair("sslmode", sslmode);
    Ok(url.to_string())
}

#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    pub secret: Option<String>,
    pub allowed_issuers: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub query_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 1985,
            query_timeout: Duration::from_secs(30),
            cors_allowed_origins: Vec::new(),
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        ServerConfig {
            port: env_or("PORT", 1985),
            query_timeout: Duration::from_secs(env_or("QUERY_TIMEOUT_SECS", 30)),
            cors_allowed_origins: get_env_var_as_vec("CORS_ALLOWED_ORIGINS", ','),
            auth: AuthConfig {
                secret: env_opt("JWT_SECRET_KEY"),
                allowed_issuers: get_env_var_as_vec("ALLOWED_ISSUERS", ','),
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub sentiment_url: Option<String>,
    pub sentiment_token: String,
    pub workers: usize,
    pub feed_utc_offset_hours: i32,
}

impl IngestConfig {
    pub fn from_env() -> Self {
        IngestConfig {
            sentiment_url: env_opt("SENTIMENT_URL"),
            sentiment_token: env::var("SENTIMENT_TOKEN").unwrap_or_default(),
            workers: env_or("INGEST_WORKERS", 6usize).max(1),
            feed_utc_offset_hours: env_or("FEED_UTC_OFFSET_HOURS", 1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env is fine; real deployments set the environment directly.
        let _ = dotenvy::dotenv();

        Ok(Config {
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env(),
            ingest: IngestConfig::from_env(),
            log_dir: env_opt("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}
