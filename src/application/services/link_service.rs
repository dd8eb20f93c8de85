//! Short link lifecycle: creation, resolution, listing with cleanup, deletion.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, non_blank};
use crate::utils::url_normalizer::normalize_url;

/// Service owning the short-code lifecycle.
///
/// Expired links are removed lazily: by the lookup that finds them, or by the
/// bulk cleanup that precedes every listing. Neither step is atomic with the
/// read that follows it.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    public_base_url: String,
    /// Bumped on every store mutation. A listing read that overlapped one is
    /// not written to the cache.
    listing_generation: AtomicU64,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `public_base_url` is the origin short URLs are built from
    /// (e.g. `https://urlai.example`).
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            listing_generation: AtomicU64::new(0),
        }
    }

    /// Creates a short link.
    ///
    /// # Flow
    ///
    /// 1. Normalize the URL (`example.com` → `https://example.com`)
    /// 2. Use `custom_code` if non-blank, otherwise generate a random 6-character code
    /// 3. Insert with `expiry_date = now + 1 month`
    /// 4. Invalidate the cached listing
    ///
    /// No uniqueness pre-check is done: the store's constraint decides.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidInput`] if the URL is empty or unusable.
    /// Returns [`AppError::CodeTaken`] if the code already exists.
    /// Returns [`AppError::Store`] on store failures.
    pub async fn create_short_link(
        &self,
        original_url: &str,
        custom_code: Option<String>,
    ) -> Result<ShortLink, AppError> {
        let normalized_url = normalize_url(original_url)
            .map_err(|e| AppError::invalid_input(e.to_string(), json!({ "field": "url" })))?;

        let short_code = non_blank(custom_code).unwrap_or_else(generate_code);

        let new_link = NewShortLink::expiring_from(normalized_url, short_code, Utc::now());
        let link = self.repository.insert(new_link).await?;

        info!(code = %link.short_code, expires = %link.expiry_date, "Short link created");
        self.invalidate_listing().await;

        Ok(link)
    }

    /// Resolves a short code to the URL it redirects to.
    ///
    /// An expired link is deleted as a side effect and reported as
    /// [`AppError::Expired`]. A failed delete is logged; the lookup still
    /// reports the link as expired.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this code.
    /// Returns [`AppError::Expired`] if the link's expiry has passed.
    /// Returns [`AppError::Store`] on store failures.
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        let link = self
            .repository
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| AppError::not_found(short_code))?;

        if link.is_expired_at(Utc::now()) {
            debug!(code = %short_code, expired_at = %link.expiry_date, "Resolved an expired link");

            match self.repository.delete_by_id(&link.id).await {
                Ok(()) => self.invalidate_listing().await,
                Err(e) => warn!(code = %short_code, error = %e, "Failed to delete expired link"),
            }

            return Err(AppError::expired(short_code));
        }

        Ok(link.original_url)
    }

    /// Lists live links, newest first.
    ///
    /// Expired links are bulk-deleted first (best effort). The listing comes
    /// from the cache when available, otherwise from the store. Links that had
    /// expired before this call started are never returned, whatever their
    /// source.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store read fails. Cleanup failures
    /// are only logged.
    pub async fn list_links(&self) -> Result<Vec<ShortLink>, AppError> {
        let started = Utc::now();

        if let Err(e) = self.cleanup_expired_before(started).await {
            warn!(error = %e, "Cleanup before listing failed");
        }

        let links = match self.cache.get_listing().await {
            Ok(Some(links)) => links,
            Ok(None) => self.load_and_cache_listing().await?,
            Err(e) => {
                warn!(error = %e, "Listing cache unavailable, reading store");
                self.repository.list_newest_first().await?
            }
        };

        Ok(links
            .into_iter()
            .filter(|link| !link.is_expired_at(started))
            .collect())
    }

    /// Deletes every link that has already expired.
    ///
    /// Returns the number of deleted links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on store failures.
    pub async fn cleanup_expired(&self) -> Result<u64, AppError> {
        self.cleanup_expired_before(Utc::now()).await
    }

    /// Deletes a link by id.
    ///
    /// No ownership check is made. Unknown ids are accepted silently.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on store failures.
    pub async fn delete_link(&self, id: &str) -> Result<(), AppError> {
        self.repository.delete_by_id(id).await?;
        info!(%id, "Short link deleted");
        self.invalidate_listing().await;
        Ok(())
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.public_base_url, short_code)
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    /// Checks that the link store answers.
    pub async fn store_health(&self) -> Result<(), AppError> {
        self.repository.health_check().await
    }

    /// Reports the cache backend name and whether it answers.
    pub async fn cache_health(&self) -> (&'static str, bool) {
        (self.cache.backend_name(), self.cache.health_check().await)
    }

    async fn cleanup_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let deleted = self.repository.delete_expired_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, "Expired links removed");
            self.invalidate_listing().await;
        }
        Ok(deleted)
    }

    async fn load_and_cache_listing(&self) -> Result<Vec<ShortLink>, AppError> {
        let generation = self.listing_generation.load(Ordering::Acquire);
        let links = self.repository.list_newest_first().await?;

        if self.listing_generation.load(Ordering::Acquire) != generation {
            debug!("Store changed during listing read, not caching");
            return Ok(links);
        }

        if let Err(e) = self.cache.set_listing(&links, None).await {
            warn!(error = %e, "Failed to cache listing");
            return Ok(links);
        }

        // A mutation that landed while the snapshot was being written may
        // have invalidated before it.
        if self.listing_generation.load(Ordering::Acquire) != generation {
            self.drop_cached_listing().await;
        }

        Ok(links)
    }

    async fn invalidate_listing(&self) {
        self.listing_generation.fetch_add(1, Ordering::AcqRel);
        self.drop_cached_listing().await;
    }

    async fn drop_cached_listing(&self) {
        if let Err(e) = self.cache.invalidate_listing().await {
            warn!(error = %e, "Failed to invalidate listing cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use crate::infrastructure::persistence::MemoryLinkRepository;
    use async_trait::async_trait;
    use chrono::{Duration, Months};
    use std::sync::atomic::AtomicBool;
    use std::sync::{OnceLock, Weak};

    fn link(id: &str, code: &str, url: &str, expiry_date: DateTime<Utc>) -> ShortLink {
        ShortLink::new(
            id.to_string(),
            url.to_string(),
            code.to_string(),
            expiry_date,
            Utc::now(),
        )
    }

    fn stored(new_link: &NewShortLink) -> ShortLink {
        link(
            "id-1",
            &new_link.short_code,
            &new_link.original_url,
            new_link.expiry_date,
        )
    }

    fn service(repo: MockLinkRepository, cache: MockCacheService) -> LinkService {
        LinkService::new(Arc::new(repo), Arc::new(cache), "https://urlai.example/")
    }

    fn quiet_cache() -> MockCacheService {
        let mut cache = MockCacheService::new();
        cache.expect_invalidate_listing().returning(|| Ok(()));
        cache
    }

    #[tokio::test]
    async fn test_create_with_generated_code() {
        let mut repo = MockLinkRepository::new();
        let before = Utc::now();

        repo.expect_insert()
            .withf(|new_link| {
                new_link.short_code.len() == 6
                    && new_link.short_code.chars().all(|c| c.is_ascii_alphanumeric())
                    && new_link.original_url == "https://example.com"
            })
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate_listing()
            .times(1)
            .returning(|| Ok(()));

        let link = service(repo, cache)
            .create_short_link("https://example.com", None)
            .await
            .unwrap();

        let after = Utc::now();
        assert!(link.expiry_date >= before.checked_add_months(Months::new(1)).unwrap());
        assert!(link.expiry_date <= after.checked_add_months(Months::new(1)).unwrap());
    }

    #[tokio::test]
    async fn test_create_normalizes_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .withf(|new_link| new_link.original_url == "https://example.com/page")
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        let link = service(repo, quiet_cache())
            .create_short_link("  example.com/page ", None)
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com/page");
    }

    #[tokio::test]
    async fn test_create_with_custom_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .withf(|new_link| new_link.short_code == "my-promo")
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        let link = service(repo, quiet_cache())
            .create_short_link("https://example.com", Some("my-promo".to_string()))
            .await
            .unwrap();

        assert_eq!(link.short_code, "my-promo");
    }

    #[tokio::test]
    async fn test_create_keeps_custom_code_verbatim() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .withf(|new_link| new_link.short_code == " Promo ")
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        let link = service(repo, quiet_cache())
            .create_short_link("https://example.com", Some(" Promo ".to_string()))
            .await
            .unwrap();

        assert_eq!(link.short_code, " Promo ");
    }

    #[tokio::test]
    async fn test_create_blank_custom_code_generates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .withf(|new_link| new_link.short_code.len() == 6)
            .times(1)
            .returning(|new_link| Ok(stored(&new_link)));

        service(repo, quiet_cache())
            .create_short_link("https://example.com", Some("   ".to_string()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_empty_url_is_invalid() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert().times(0);

        let err = service(repo, MockCacheService::new())
            .create_short_link("   ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput { .. }));
        assert_eq!(err.to_string(), "URL is required");
    }

    #[tokio::test]
    async fn test_create_unparseable_url_is_invalid() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert().times(0);

        let err = service(repo, MockCacheService::new())
            .create_short_link("javascript:alert(1)", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_create_code_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|new_link| Err(AppError::code_taken(new_link.short_code)));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate_listing().times(0);

        let err = service(repo, cache)
            .create_short_link("https://example.com", Some("taken".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::CodeTaken { ref code } if code == "taken"));
    }

    #[tokio::test]
    async fn test_generated_code_collision_message_is_neutral() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .returning(|new_link| Err(AppError::code_taken(new_link.short_code)));

        let err = service(repo, MockCacheService::new())
            .create_short_link("https://example.com", None)
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Short code \""), "{message}");
        assert!(!message.contains("Custom"));
    }

    #[tokio::test]
    async fn test_create_store_error_passes_through() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .returning(|_| Err(AppError::store("connection refused", json!({}))));

        let err = service(repo, MockCacheService::new())
            .create_short_link("https://example.com", None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Store { .. }));
    }

    #[tokio::test]
    async fn test_resolve_live_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "abc123")
            .returning(|_| {
                Ok(Some(link(
                    "id-1",
                    "abc123",
                    "https://example.com/target",
                    Utc::now() + Duration::days(3),
                )))
            });
        repo.expect_delete_by_id().times(0);

        let url = service(repo, MockCacheService::new())
            .resolve("abc123")
            .await
            .unwrap();

        assert_eq!(url, "https://example.com/target");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().returning(|_| Ok(None));

        let err = service(repo, MockCacheService::new())
            .resolve("missing")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_expired_deletes_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().returning(|_| {
            Ok(Some(link(
                "id-old",
                "old",
                "https://example.com",
                Utc::now() - Duration::minutes(5),
            )))
        });
        repo.expect_delete_by_id()
            .withf(|id| id == "id-old")
            .times(1)
            .returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate_listing()
            .times(1)
            .returning(|| Ok(()));

        let err = service(repo, cache).resolve("old").await.unwrap_err();
        assert!(matches!(err, AppError::Expired { .. }));
    }

    #[tokio::test]
    async fn test_resolve_expired_reports_expired_even_if_delete_fails() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().returning(|_| {
            Ok(Some(link(
                "id-old",
                "old",
                "https://example.com",
                Utc::now() - Duration::minutes(5),
            )))
        });
        repo.expect_delete_by_id()
            .returning(|_| Err(AppError::store("timeout", json!({}))));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate_listing().times(0);

        let err = service(repo, cache).resolve("old").await.unwrap_err();
        assert!(matches!(err, AppError::Expired { .. }));
    }

    #[tokio::test]
    async fn test_list_cleans_up_then_reads_store_on_cache_miss() {
        let mut repo = MockLinkRepository::new();
        let before = Utc::now();

        repo.expect_delete_expired_before()
            .withf(move |cutoff| *cutoff >= before)
            .times(1)
            .returning(|_| Ok(0));
        repo.expect_list_newest_first().times(1).returning(|| {
            Ok(vec![
                link("2", "new", "https://b.com", Utc::now() + Duration::days(2)),
                link("1", "old", "https://a.com", Utc::now() + Duration::days(1)),
            ])
        });

        let mut cache = MockCacheService::new();
        cache.expect_get_listing().times(1).returning(|| Ok(None));
        cache
            .expect_set_listing()
            .withf(|links, ttl| links.len() == 2 && ttl.is_none())
            .times(1)
            .returning(|_, _| Ok(()));
        cache.expect_invalidate_listing().times(0);

        let links = service(repo, cache).list_links().await.unwrap();
        let codes: Vec<&str> = links.iter().map(|l| l.short_code.as_str()).collect();
        assert_eq!(codes, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_list_filters_expired_entries_from_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before().returning(|_| Ok(0));
        repo.expect_list_newest_first().times(0);

        let mut cache = MockCacheService::new();
        cache.expect_get_listing().returning(|| {
            Ok(Some(vec![
                link("2", "live", "https://b.com", Utc::now() + Duration::days(2)),
                link("1", "stale", "https://a.com", Utc::now() - Duration::days(1)),
            ]))
        });

        let links = service(repo, cache).list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].short_code, "live");
    }

    #[tokio::test]
    async fn test_list_invalidates_cache_when_cleanup_removed_links() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before().returning(|_| Ok(3));
        repo.expect_list_newest_first().returning(|| Ok(vec![]));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate_listing()
            .times(1)
            .returning(|| Ok(()));
        cache.expect_get_listing().returning(|| Ok(None));
        cache.expect_set_listing().returning(|_, _| Ok(()));

        let links = service(repo, cache).list_links().await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn test_list_survives_cleanup_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before()
            .returning(|_| Err(AppError::store("timeout", json!({}))));
        repo.expect_list_newest_first().returning(|| {
            Ok(vec![
                link("1", "live", "https://a.com", Utc::now() + Duration::days(1)),
                link("2", "stale", "https://b.com", Utc::now() - Duration::days(1)),
            ])
        });

        let mut cache = MockCacheService::new();
        cache.expect_get_listing().returning(|| Ok(None));
        cache.expect_set_listing().returning(|_, _| Ok(()));

        let links = service(repo, cache).list_links().await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].short_code, "live");
    }

    #[tokio::test]
    async fn test_list_reads_store_when_cache_errors() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before().returning(|_| Ok(0));
        repo.expect_list_newest_first()
            .times(1)
            .returning(|| Ok(vec![]));

        let mut cache = MockCacheService::new();
        cache
            .expect_get_listing()
            .returning(|| Err(CacheError::ConnectionError("down".to_string())));
        cache.expect_set_listing().times(0);

        assert!(service(repo, cache).list_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_invalidates_listing() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_by_id()
            .withf(|id| id == "id-9")
            .times(1)
            .returning(|_| Ok(()));

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate_listing()
            .times(1)
            .returning(|| Ok(()));

        service(repo, cache).delete_link("id-9").await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_expired_reports_count() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete_expired_before().returning(|_| Ok(2));

        let deleted = service(repo, quiet_cache())
            .cleanup_expired()
            .await
            .unwrap();
        assert_eq!(deleted, 2);
    }

    /// Creates a link from inside the listing read, so the snapshot it
    /// returns predates the insert.
    struct CreateDuringListing {
        inner: MemoryLinkRepository,
        service: OnceLock<Weak<LinkService>>,
        fired: AtomicBool,
    }

    #[async_trait]
    impl LinkRepository for CreateDuringListing {
        async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
            self.inner.insert(new_link).await
        }

        async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
            self.inner.find_by_code(short_code).await
        }

        async fn list_newest_first(&self) -> Result<Vec<ShortLink>, AppError> {
            let snapshot = self.inner.list_newest_first().await?;
            if !self.fired.swap(true, Ordering::SeqCst) {
                let service = self.service.get().and_then(Weak::upgrade).unwrap();
                service
                    .create_short_link("https://late.example", Some("late".to_string()))
                    .await?;
            }
            Ok(snapshot)
        }

        async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
            self.inner.delete_by_id(id).await
        }

        async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
            self.inner.delete_expired_before(cutoff).await
        }

        async fn health_check(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_listing_overlapping_a_create_is_not_cached() {
        let repo = Arc::new(CreateDuringListing {
            inner: MemoryLinkRepository::new(),
            service: OnceLock::new(),
            fired: AtomicBool::new(false),
        });

        let mut cache = MockCacheService::new();
        cache.expect_get_listing().returning(|| Ok(None));
        cache
            .expect_invalidate_listing()
            .times(1)
            .returning(|| Ok(()));
        // Only the second, undisturbed listing may be cached.
        cache
            .expect_set_listing()
            .withf(|links, _| links.iter().any(|l| l.short_code == "late"))
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = Arc::new(LinkService::new(
            repo.clone(),
            Arc::new(cache),
            "https://urlai.example",
        ));
        repo.service.set(Arc::downgrade(&svc)).unwrap();

        let first = svc.list_links().await.unwrap();
        assert!(first.is_empty());

        let second = svc.list_links().await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].short_code, "late");
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let svc = service(MockLinkRepository::new(), MockCacheService::new());
        assert_eq!(svc.short_url("abc123"), "https://urlai.example/abc123");
    }
}
