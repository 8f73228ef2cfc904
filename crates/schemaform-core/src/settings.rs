//! Settings for schemaform-rs.
//!
//! This module provides [`FormFlags`], the behavioural switches a host hands
//! to every form (live validation, validation on/off, HTML5 validation,
//! render hints), and [`Settings`], which bundles those flags with the
//! workspace-wide logging and id-prefix configuration.

use serde::{Deserialize, Serialize};

/// Behavioural switches for a single form.
///
/// # Examples
///
/// ```
/// use schemaform_core::settings::FormFlags;
///
/// let flags = FormFlags::default();
/// assert!(!flags.live_validate);
/// assert!(!flags.no_validate);
/// assert!(flags.show_error_list);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFlags {
    /// Disables all validation, including on submit.
    pub no_validate: bool,
    /// Validates on every data change instead of only on submit.
    pub live_validate: bool,
    /// Asks the host not to run its own (browser-native) validation.
    pub no_html5_validate: bool,
    /// Hint passed through to the field tree: finish rendering before
    /// reporting changes.
    pub safe_render_completion: bool,
    /// Whether the error list is rendered above the fields.
    pub show_error_list: bool,
    /// Whether the "Validating..." indicator is rendered while a deferred
    /// validation is pending.
    pub render_validating_message: bool,
}

impl Default for FormFlags {
    fn default() -> Self {
        Self {
            no_validate: false,
            live_validate: false,
            no_html5_validate: false,
            safe_render_completion: false,
            show_error_list: true,
            render_validating_message: true,
        }
    }
}

impl FormFlags {
    /// Returns `true` if validation should run on every change.
    pub const fn validates_live(&self) -> bool {
        self.live_validate && !self.no_validate
    }
}

/// The complete set of workspace settings.
///
/// # Examples
///
/// ```
/// use schemaform_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// assert_eq!(settings.id_prefix, "root");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Forms ────────────────────────────────────────────────────────

    /// Prefix for derived field ids when the ui schema names no root id.
    pub id_prefix: String,
    /// Default flags applied to forms built from these settings.
    pub flags: FormFlags,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            id_prefix: "root".to_string(),
            flags: FormFlags::default(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.id_prefix, "root");
        assert_eq!(s.log_level, "info");
        assert_eq!(s.flags, FormFlags::default());
    }

    #[test]
    fn test_default_flags() {
        let f = FormFlags::default();
        assert!(!f.no_validate);
        assert!(!f.live_validate);
        assert!(!f.no_html5_validate);
        assert!(!f.safe_render_completion);
        assert!(f.show_error_list);
        assert!(f.render_validating_message);
    }

    #[test]
    fn test_validates_live() {
        let mut f = FormFlags {
            live_validate: true,
            ..FormFlags::default()
        };
        assert!(f.validates_live());
        f.no_validate = true;
        assert!(!f.validates_live());
    }

    #[test]
    fn test_flags_partial_deserialize() {
        let f: FormFlags = serde_json::from_str(r#"{"live_validate": true}"#).unwrap();
        assert!(f.live_validate);
        assert!(f.show_error_list);
    }
}
