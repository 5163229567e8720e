//! Error types for the expiring cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the expiring cache.
///
/// Only construction can fail. Lookups report absence through `Option`
/// and inserts have no designed error path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Rejected configuration value (non-positive TTL or sweep interval,
    /// unparsable environment variable)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The cache was constructed outside of a tokio runtime, so the
    /// reclamation task has nowhere to run
    #[error("No tokio runtime available to run the reclamation task")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the expiring cache.
pub type Result<T> = std::result::Result<T, CacheError>;
