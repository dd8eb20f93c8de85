//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::ShortLink;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Redis cache for the link listing.
///
/// The listing is stored as one JSON document under a namespaced key.
/// All operations are fail-open: errors are logged but don't propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: usize,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied when [`CacheService::set_listing`] is called
    ///   with `ttl_seconds = None`; controlled via `CACHE_TTL_SECONDS` env var
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds as usize,
            key_prefix: "urlai:".to_string(),
        })
    }

    fn listing_key(&self) -> String {
        format!("{}links", self.key_prefix)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_listing(&self) -> CacheResult<Option<Vec<ShortLink>>> {
        let key = self.listing_key();
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ShortLink>>(&raw) {
                Ok(links) => {
                    debug!("Cache HIT: listing ({} links)", links.len());
                    Ok(Some(links))
                }
                Err(e) => {
                    warn!("Discarding unreadable cached listing: {}", e);
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!("Cache MISS: listing");
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for listing: {}", e);
                Ok(None)
            }
        }
    }

    async fn set_listing(&self, links: &[ShortLink], ttl: Option<usize>) -> CacheResult<()> {
        let key = self.listing_key();
        let mut conn = self.client.clone();
        let ttl_seconds = ttl.unwrap_or(self.default_ttl);

        let payload = serde_json::to_string(links)
            .map_err(|e| CacheError::OperationError(format!("Serialize listing: {}", e)))?;

        match conn
            .set_ex::<_, _, ()>(&key, payload, ttl_seconds as u64)
            .await
        {
            Ok(_) => {
                debug!(
                    "Cache SET: listing ({} links, TTL: {}s)",
                    links.len(),
                    ttl_seconds
                );
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for listing: {}", e);
                Ok(())
            }
        }
    }

    async fn invalidate_listing(&self) -> CacheResult<()> {
        let key = self.listing_key();
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: listing");
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for listing: {}", e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
