//! Link repository implementations.
//!
//! # Repositories
//!
//! - [`RestLinkRepository`] - Remote PostgREST table (production)
//! - [`MemoryLinkRepository`] - In-process map for local development and tests

pub mod memory_link_repository;
pub mod rest_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use rest_link_repository::RestLinkRepository;
