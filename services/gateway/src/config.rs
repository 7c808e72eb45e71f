//! Environment-driven configuration

use anyhow::Context;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Base URL of the external settlement layer
    pub settlement_url: String,
    /// Salt for trader identity hashing
    pub salt_secret: String,
    pub match_interval: Duration,
    pub health_check_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => 3001,
        };
        let settlement_url =
            std::env::var("SETTLEMENT_URL").context("SETTLEMENT_URL environment variable is required")?;
        let salt_secret =
            std::env::var("SALT_SECRET").context("SALT_SECRET environment variable is required")?;
        let match_interval = Duration::from_millis(env_millis("MATCH_INTERVAL_MS", 200)?);
        let health_check_interval =
            Duration::from_millis(env_millis("HEALTH_CHECK_INTERVAL_MS", 60_000)?);

        Ok(Self {
            port,
            settlement_url,
            salt_secret,
            match_interval,
            health_check_interval,
        })
    }
}

fn env_millis(name: &str, default: u64) -> Result<u64, anyhow::Error> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be an integer millisecond value")),
        Err(_) => Ok(default),
    }
}
