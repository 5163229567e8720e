//! Expiring Cache - a time-expiring response cache
//!
//! Memoizes opaque byte payloads keyed by request identifier so repeated
//! requests for the same resource can skip a network round-trip within a
//! freshness window. A background task reclaims stale entries.
//!
//! ```ignore
//! let cache = ExpiringCache::new(Duration::from_secs(300))?;
//! cache.add("https://example.test/location-area?offset=0", body);
//! if let Some(bytes) = cache.get("https://example.test/location-area?offset=0") {
//!     // decode bytes
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{CacheStats, ExpiringCache, SweepPolicy};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
