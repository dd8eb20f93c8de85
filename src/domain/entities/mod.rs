//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - A stored code → URL mapping with its expiry
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with a separate struct for creation:
//! [`NewShortLink`] carries only the fields the caller decides, the store
//! assigns `id` and `created_at`.

pub mod short_link;

pub use short_link::{LINK_LIFETIME_MONTHS, NewShortLink, ShortLink, expiry_from};
