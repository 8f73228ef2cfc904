//! Settings loading from configuration files.
//!
//! Settings start from [`Settings::default`], are overlaid with whatever a
//! TOML or JSON file supplies, and finally with environment variables.
//! Partial files are fine: every table is merged key by key over the
//! defaults, so a file may set a single flag.
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `SCHEMAFORM_DEBUG` | `debug` |
//! | `SCHEMAFORM_LOG_LEVEL` | `log_level` |
//! | `SCHEMAFORM_ID_PREFIX` | `id_prefix` |
//! | `SCHEMAFORM_LIVE_VALIDATE` | `flags.live_validate` |
//! | `SCHEMAFORM_NO_VALIDATE` | `flags.no_validate` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use schemaform_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("config/forms.toml").unwrap();
//! ```

use std::path::Path;

use serde_json::Value;

use crate::error::FormError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or a field has the wrong type.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormError> {
    let value: Value = toml::from_str(toml_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    overlay_defaults(value, "TOML")
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a field has the wrong type.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormError> {
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    overlay_defaults(value, "JSON")
}

/// Loads settings from a file, picking the format from its extension.
///
/// `.json` files are read as JSON; anything else is read as TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to read '{}': {e}", path.display()))
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => from_json_str(&content),
        _ => from_toml_str(&content),
    }
}

/// Loads settings from a file and then applies environment overrides.
///
/// # Errors
///
/// See [`from_file`].
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from environment variables alone, starting from defaults.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" (case-insensitive) as true and
/// anything else as false. A blank id prefix is ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("SCHEMAFORM_DEBUG") {
        settings.debug = parse_bool(&val);
    }
    if let Ok(val) = std::env::var("SCHEMAFORM_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Ok(val) = std::env::var("SCHEMAFORM_ID_PREFIX") {
        let val = val.trim();
        if !val.is_empty() {
            settings.id_prefix = val.to_string();
        }
    }
    if let Ok(val) = std::env::var("SCHEMAFORM_LIVE_VALIDATE") {
        settings.flags.live_validate = parse_bool(&val);
    }
    if let Ok(val) = std::env::var("SCHEMAFORM_NO_VALIDATE") {
        settings.flags.no_validate = parse_bool(&val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn overlay_defaults(value: Value, format: &str) -> Result<Settings, FormError> {
    let mut merged = serde_json::to_value(Settings::default()).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;
    overlay(&mut merged, value);
    serde_json::from_value(merged).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Writes `update` over `target`, recursing into objects present in both.
fn overlay(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => {
            for (key, value) in update {
                match target.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, update) => *target = update,
    }
}
