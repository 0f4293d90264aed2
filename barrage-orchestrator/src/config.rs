//! Orchestrator configuration
//!
//! Everything is read from the environment; unset variables fall back to
//! defaults, malformed ones abort startup.

use barrage_core::domain::profile::ProfileLimits;
use barrage_runner::RunnerConfig;
use barrage_runner::config::parse_var;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Address the HTTP API listens on
    pub bind_addr: String,

    /// How long finished jobs are kept; zero disables eviction
    pub job_retention: Duration,

    /// Period of the retention sweeper
    pub sweep_interval: Duration,

    /// Ceilings applied to submitted load profiles
    pub limits: ProfileLimits,

    pub runner: RunnerConfig,
}

impl OrchestratorConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - BARRAGE_HOST (optional, default: 0.0.0.0)
    /// - PORT (optional, default: 8080)
    /// - BARRAGE_JOB_RETENTION_SECS (optional, default: 3600, 0 disables)
    /// - BARRAGE_SWEEP_INTERVAL_SECS (optional, default: 60)
    /// - BARRAGE_MAX_ITERATIONS (optional, default: 1000000)
    /// - BARRAGE_MAX_CONCURRENCY (optional, default: 1000)
    /// - BARRAGE_MAX_PAYLOAD_KB (optional, default: 10240)
    /// - BARRAGE_MAX_TIMEOUT_MS (optional, default: 300000)
    /// - plus the runner variables, see [`RunnerConfig::from_env`]
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BARRAGE_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_var(&lookup, "PORT")?.unwrap_or(8080);

        let job_retention = Duration::from_secs(
            parse_var(&lookup, "BARRAGE_JOB_RETENTION_SECS")?.unwrap_or(3600),
        );
        let sweep_interval = Duration::from_secs(
            parse_var(&lookup, "BARRAGE_SWEEP_INTERVAL_SECS")?.unwrap_or(60),
        );

        let defaults = ProfileLimits::default();
        let limits = ProfileLimits {
            max_iterations: parse_var(&lookup, "BARRAGE_MAX_ITERATIONS")?
                .unwrap_or(defaults.max_iterations),
            max_concurrency: parse_var(&lookup, "BARRAGE_MAX_CONCURRENCY")?
                .unwrap_or(defaults.max_concurrency),
            max_payload_kb: parse_var(&lookup, "BARRAGE_MAX_PAYLOAD_KB")?
                .unwrap_or(defaults.max_payload_kb),
            max_timeout_ms: parse_var(&lookup, "BARRAGE_MAX_TIMEOUT_MS")?
                .unwrap_or(defaults.max_timeout_ms),
        };

        let runner = RunnerConfig::from_lookup(&lookup)?;

        Ok(Self {
            bind_addr: format!("{}:{}", host.trim(), port),
            job_retention,
            sweep_interval,
            limits,
            runner,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.job_retention.is_zero() && self.sweep_interval.is_zero() {
            anyhow::bail!("BARRAGE_SWEEP_INTERVAL_SECS must be greater than 0");
        }

        if self.limits.max_concurrency == 0 {
            anyhow::bail!("BARRAGE_MAX_CONCURRENCY must be greater than 0");
        }

        if self.limits.max_timeout_ms == 0 {
            anyhow::bail!("BARRAGE_MAX_TIMEOUT_MS must be greater than 0");
        }

        self.runner.validate()
    }

    pub fn retention_enabled(&self) -> bool {
        !self.job_retention.is_zero()
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            job_retention: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
            limits: ProfileLimits::default(),
            runner: RunnerConfig::default(),
        }
    }
}
