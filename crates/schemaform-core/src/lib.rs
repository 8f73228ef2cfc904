//! # schemaform-core
//!
//! Core types, settings, and error types for the schemaform-rs workspace.
//! This crate has no dependency on the other workspace crates and provides
//! the foundation they all build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Form flags and workspace-wide configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{FormError, FormResult};
pub use settings::{FormFlags, Settings};
