use anyhow::{Context, Result};
use chrono::Duration;
use shareit_booking::{EngineConfig, OverlapPolicy};

/// Upper bound for `LAST_BOOKING_SKEW_SECS`: one day.
const MAX_LAST_BOOKING_SKEW_SECS: i64 = 86_400;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub http_addr: String,
    pub max_connections: u32,
    pub engine: EngineConfig,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing stays testable
    /// without touching the process environment.
    pub fn from_lookup<F>(default_http_addr: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is required")?;
        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .map(|raw| raw.trim().parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
            .unwrap_or(10);

        let overlap_policy = lookup("OVERLAP_POLICY")
            .map(|raw| raw.parse::<OverlapPolicy>())
            .transpose()
            .context("OVERLAP_POLICY is invalid")?
            .unwrap_or_default();

        let skew_secs = lookup("LAST_BOOKING_SKEW_SECS")
            .map(|raw| raw.trim().parse::<i64>())
            .transpose()
            .context("LAST_BOOKING_SKEW_SECS must be an integer number of seconds")?
            .unwrap_or(0);
        if !(0..=MAX_LAST_BOOKING_SKEW_SECS).contains(&skew_secs) {
            anyhow::bail!(
                "LAST_BOOKING_SKEW_SECS must be between 0 and {MAX_LAST_BOOKING_SKEW_SECS}"
            );
        }
        let last_booking_skew = Duration::try_seconds(skew_secs)
            .context("LAST_BOOKING_SKEW_SECS is out of range")?;

        Ok(Self {
            database_url,
            http_addr,
            max_connections,
            engine: EngineConfig {
                overlap_policy,
                last_booking_skew,
            },
        })
    }
}
