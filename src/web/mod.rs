//! Web layer for the browser UI.
//!
//! Server-rendered pages for creating, listing and deleting short links, and
//! for injecting the widget into an uploaded HTML page. Uses Askama templates.
//! Every render receives a view model built by its handler; no UI state is
//! kept between requests.
//!
//! # Modules
//!
//! - [`handlers`] - Template rendering and form handlers
//! - [`routes`] - Page route configuration

pub mod handlers;
pub mod routes;
