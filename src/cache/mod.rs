//! Cache Module
//!
//! Provides in-memory caching of opaque payloads with time-based reclamation.

mod entry;
mod expiring;
mod policy;
mod stats;
mod store;


// Re-export public types
pub(crate) use entry::CacheEntry;
pub use expiring::ExpiringCache;
pub use policy::SweepPolicy;
pub use stats::CacheStats;
pub(crate) use store::CacheStore;

pub(crate) use expiring::lock_store;
