//! # URLAI
//!
//! A small URL shortener with expiring links, built with Axum on top of a
//! remote PostgREST table.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - The short link entity and the repository trait
//! - **Application Layer** ([`application`]) - Link lifecycle: create, resolve, list, delete
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgREST and in-memory stores, Redis cache
//! - **API Layer** ([`api`]) - Public shorten endpoint, redirect, health, widget script
//! - **Web Layer** ([`web`]) - HTML home page and widget injection tool
//!
//! ## Features
//!
//! - Random 6-character codes or custom codes
//! - Links expire one calendar month after creation; expired links are
//!   deleted lazily on lookup and before every listing
//! - Embeddable widget (`/urlai-widget.js`) calling the CORS-open
//!   `POST /api/shorten`
//! - Optional Redis cache for the listing
//!
//! ## Quick Start
//!
//! ```bash
//! # Remote store
//! export STORE_URL="https://xyz.supabase.co"
//! export STORE_API_KEY="service-role-key"
//!
//! # Or keep everything in memory
//! export STORE_BACKEND="memory"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;
pub mod web;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::LinkService;
    pub use crate::domain::entities::{NewShortLink, ShortLink};
    pub use crate::domain::repositories::LinkRepository;
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
