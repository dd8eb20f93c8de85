//! HTML template rendering handlers for the web UI.

mod home;
mod inject;
mod links;

pub use home::{HomeTemplate, LinkView, create_link_handler, home_handler};
pub use inject::{InjectTemplate, inject_form_handler, inject_handler};
pub use links::delete_link_handler;
