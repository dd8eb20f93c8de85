//! Repository trait for short link data access.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface over the single `ShortLink` collection.
///
/// Implementations own every detail of how the store is reached; callers never
/// build paths or queries themselves.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::RestLinkRepository`] - PostgREST table
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::CodeTaken`] if the short code already exists; the
    /// existing record is left untouched.
    ///
    /// Returns [`AppError::Store`] on any other store failure.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short code, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on store failures.
    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Lists every stored link, newest `created_at` first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on store failures.
    async fn list_newest_first(&self) -> Result<Vec<ShortLink>, AppError>;

    /// Deletes a link by id.
    ///
    /// Deleting an id that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on store failures.
    async fn delete_by_id(&self, id: &str) -> Result<(), AppError>;

    /// Deletes every link whose `expiry_date` is strictly before `cutoff`.
    ///
    /// Returns the number of deleted records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on store failures.
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;

    /// Checks that the store is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}
