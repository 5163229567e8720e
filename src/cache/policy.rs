//! Sweep Policy Module
//!
//! Decides which resident entries a reclamation pass removes.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::CacheEntry;
use crate::error::CacheError;

// == Sweep Policy ==
/// Selects the comparison a sweep applies to each entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SweepPolicy {
    /// Remove only entries whose age strictly exceeds the TTL.
    #[default]
    Stale,
    /// Remove every entry created at or before the sweep instant, which is
    /// every resident entry. Entries then live until the next tick.
    ClearAll,
}

impl SweepPolicy {
    /// Returns true if `entry` should be removed by a sweep running at `now`.
    pub(crate) fn should_reclaim(&self, entry: &CacheEntry, now: Instant, ttl: Duration) -> bool {
        match self {
            SweepPolicy::Stale => entry.is_stale(now, ttl),
            SweepPolicy::ClearAll => now >= entry.created_at,
        }
    }
}

impl fmt::Display for SweepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepPolicy::Stale => f.write_str("stale"),
            SweepPolicy::ClearAll => f.write_str("clear-all"),
        }
    }
}

impl FromStr for SweepPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stale" => Ok(SweepPolicy::Stale),
            "clear-all" | "clear_all" | "all" => Ok(SweepPolicy::ClearAll),
            other => Err(CacheError::Configuration(format!(
                "unknown sweep policy '{}', expected 'stale' or 'clear-all'",
                other
            ))),
        }
    }
}
