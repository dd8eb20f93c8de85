//! Utility functions for code generation, URL processing, and widget injection.
//!
//! - [`code_generator`] - Short code generation and custom code sanitization
//! - [`url_normalizer`] - URL normalization and validation
//! - [`widget_injector`] - Widget `<script>` insertion into HTML documents

pub mod code_generator;
pub mod url_normalizer;
pub mod widget_injector;
