//! Cache service trait and error types.

use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching the link listing.
///
/// Implementations must be thread-safe and fail open: a cache that cannot be
/// reached behaves like an empty cache, the listing is then read from the store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached listing.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(links))` on cache hit
    /// - `Ok(None)` on cache miss or error (fail-open behavior)
    async fn get_listing(&self) -> CacheResult<Option<Vec<ShortLink>>>;

    /// Stores the listing with an optional TTL.
    ///
    /// `ttl_seconds = None` uses the implementation's default TTL.
    async fn set_listing(&self, links: &[ShortLink], ttl_seconds: Option<usize>)
    -> CacheResult<()>;

    /// Drops the cached listing.
    ///
    /// Called after every mutation of the link collection.
    async fn invalidate_listing(&self) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short name of the backend, reported by health checks.
    fn backend_name(&self) -> &'static str;
}
