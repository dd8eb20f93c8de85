//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence and caching.
//!
//! # Modules
//!
//! - [`cache`] - Listing cache (Redis and no-op implementations)
//! - [`persistence`] - Link repository implementations (PostgREST, in-memory)

pub mod cache;
pub mod persistence;
