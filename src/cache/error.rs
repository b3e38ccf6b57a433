//! Error types for cache construction and configuration.

use thiserror::Error;

/// Errors that can occur when building cache components.
///
/// Lookups, insertions, and removals never fail: a miss is an ordinary
/// `None` and removing an unknown key is a no-op. The only failure mode in
/// this subsystem is rejecting malformed construction parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The eviction tracker was handed parameters it cannot operate with.
    ///
    /// Raised when capacity is zero or the eviction fraction lies outside
    /// the open interval (0, 1).
    #[error("invalid cache configuration: {reason}")]
    InvalidConfiguration {
        /// Which constraint was violated.
        reason: &'static str,
    },
}

/// A specialized `Result` type for cache construction.
pub type Result<T> = std::result::Result<T, CacheError>;
