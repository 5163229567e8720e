//! Configuration Module
//!
//! Handles loading and validating cache configuration, optionally from
//! environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::cache::SweepPolicy;
use crate::error::{CacheError, Result};

/// Default freshness window: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry may stay resident before it becomes stale
    pub ttl: Duration,
    /// Period between reclamation passes
    pub sweep_interval: Duration,
    /// Which entries a reclamation pass removes
    pub policy: SweepPolicy,
}

impl CacheConfig {
    /// Creates a config sweeping once per `ttl` with the [`SweepPolicy::Stale`] policy.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sweep_interval: ttl,
            policy: SweepPolicy::default(),
        }
    }

    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    pub fn with_policy(mut self, policy: SweepPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a new config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 300000)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Reclamation period in milliseconds (default: TTL)
    /// - `CACHE_SWEEP_POLICY` - `stale` or `clear-all` (default: `stale`)
    ///
    /// Unlike a silent fallback, malformed or non-positive values are
    /// reported as [`CacheError::Configuration`].
    pub fn from_env() -> Result<Self> {
        let ttl = match env::var("CACHE_TTL_MS") {
            Ok(raw) => parse_millis("CACHE_TTL_MS", &raw)?,
            Err(_) => DEFAULT_TTL,
        };
        let sweep_interval = match env::var("CACHE_SWEEP_INTERVAL_MS") {
            Ok(raw) => parse_millis("CACHE_SWEEP_INTERVAL_MS", &raw)?,
            Err(_) => ttl,
        };
        let policy = match env::var("CACHE_SWEEP_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => SweepPolicy::default(),
        };

        let config = Self {
            ttl,
            sweep_interval,
            policy,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects a zero TTL or a zero sweep interval.
    ///
    /// A zero period would make the reclamation loop spin.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            warn!("Rejecting cache configuration with zero TTL");
            return Err(CacheError::Configuration(
                "ttl must be a positive duration".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            warn!("Rejecting cache configuration with zero sweep interval");
            return Err(CacheError::Configuration(
                "sweep interval must be a positive duration".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Parses a signed millisecond count, rejecting anything not strictly positive.
pub fn parse_millis(name: &str, raw: &str) -> Result<Duration> {
    let millis: i64 = raw.trim().parse().map_err(|_| {
        CacheError::Configuration(format!("{} must be an integer, got '{}'", name, raw))
    })?;

    if millis <= 0 {
        warn!(%name, millis, "Rejecting non-positive duration");
        return Err(CacheError::Configuration(format!(
            "{} must be positive, got {}",
            name, millis
        )));
    }

    Ok(Duration::from_millis(millis as u64))
}
