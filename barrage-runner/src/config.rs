//! Runner configuration
//!
//! Tuning for the batch scheduler and the pooled HTTP client that issues
//! load requests.

use anyhow::Context;
use std::time::Duration;

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Fixed pause inserted between two waves of a job
    pub wave_pause: Duration,

    /// Skip TLS certificate verification against the target
    pub accept_invalid_certs: bool,

    /// Idle keep-alive connections kept per target host
    pub pool_max_idle_per_host: usize,
}

impl RunnerConfig {
    /// Upper bound for `wave_pause`; anything longer is a misconfiguration
    const MAX_WAVE_PAUSE: Duration = Duration::from_secs(10);

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - BARRAGE_WAVE_PAUSE_MS (optional, default: 50)
    /// - BARRAGE_ACCEPT_INVALID_CERTS (optional, default: false)
    /// - BARRAGE_POOL_MAX_IDLE_PER_HOST (optional, default: 32)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let wave_pause = parse_var(&lookup, "BARRAGE_WAVE_PAUSE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.wave_pause);

        let accept_invalid_certs = parse_var(&lookup, "BARRAGE_ACCEPT_INVALID_CERTS")?
            .unwrap_or(defaults.accept_invalid_certs);

        let pool_max_idle_per_host = parse_var(&lookup, "BARRAGE_POOL_MAX_IDLE_PER_HOST")?
            .unwrap_or(defaults.pool_max_idle_per_host);

        Ok(Self {
            wave_pause,
            accept_invalid_certs,
            pool_max_idle_per_host,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.wave_pause > Self::MAX_WAVE_PAUSE {
            anyhow::bail!(
                "wave_pause must not exceed {}ms",
                Self::MAX_WAVE_PAUSE.as_millis()
            );
        }

        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            wave_pause: Duration::from_millis(50),
            accept_invalid_certs: false,
            pool_max_idle_per_host: 32,
        }
    }
}

/// Reads and parses an optional variable, failing on malformed values
pub fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        _ => Ok(None),
    }
}
