use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use anyhow::{Context, anyhow};
use tracing::{info, warn};

pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub session_secure: bool,
}

impl Config {
    /// Reads settings from the environment. Call after `dotenvy::dotenv()` so
    /// values from a local `.env` file are visible.
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://db.sqlite3?mode=rwc")?,
            host: try_load("POLLS_HOST", "0.0.0.0")?,
            port: try_load("POLLS_PORT", "8000")?,
            db_max_connections: try_load("DB_MAX_CONNECTIONS", "5")?,
            session_secure: try_load("SESSION_SECURE", "false")?,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Environment misconfigured: {key}={raw:?} ({e})")
    })
}
