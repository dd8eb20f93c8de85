//! Short link entity representing a code → URL mapping with an expiry.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// How long a freshly created link stays resolvable.
pub const LINK_LIFETIME_MONTHS: u32 = 1;

/// A stored short link.
///
/// `id` is assigned by the store and treated as opaque: the remote table may
/// hand out UUIDs or integers, both are carried as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: String,
    pub original_url: String,
    pub short_code: String,
    pub expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: String,
        original_url: String,
        short_code: String,
        expiry_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            original_url,
            short_code,
            expiry_date,
            created_at,
        }
    }

    /// Returns true if the link had already expired at `now`.
    ///
    /// A link whose expiry equals `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }
}

/// Input data for creating a new short link.
///
/// `id` and `created_at` are filled in by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewShortLink {
    pub original_url: String,
    pub short_code: String,
    pub expiry_date: DateTime<Utc>,
}

impl NewShortLink {
    /// Builds an insert payload whose expiry is one calendar month after `now`.
    pub fn expiring_from(original_url: String, short_code: String, now: DateTime<Utc>) -> Self {
        Self {
            original_url,
            short_code,
            expiry_date: expiry_from(now),
        }
    }
}

/// Computes the expiry for a link created at `created_at`.
///
/// Adds one calendar month; days past the end of the target month are
/// clamped to its last day (Jan 31 → Feb 28/29).
pub fn expiry_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at
        .checked_add_months(Months::new(LINK_LIFETIME_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
