//! In-memory implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link repository kept entirely in process memory.
///
/// Keyed by short code, so the uniqueness constraint of the remote table is
/// enforced by the map's entry API. Intended for local development
/// (`STORE_BACKEND=memory`) and tests; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, ShortLink>,
}

impl MemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links, expired ones included.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        match self.links.entry(new_link.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::code_taken(new_link.short_code)),
            Entry::Vacant(slot) => {
                let link = ShortLink::new(
                    Uuid::new_v4().to_string(),
                    new_link.original_url,
                    new_link.short_code,
                    new_link.expiry_date,
                    Utc::now(),
                );
                slot.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.get(short_code).map(|entry| entry.value().clone()))
    }

    async fn list_newest_first(&self) -> Result<Vec<ShortLink>, AppError> {
        let mut links: Vec<ShortLink> = self
            .links
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        self.links.retain(|_, link| link.id != id);
        Ok(())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut removed = 0u64;
        self.links.retain(|_, link| {
            let expired = link.is_expired_at(cutoff);
            if expired {
                removed += 1;
            }
            !expired
        });
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
