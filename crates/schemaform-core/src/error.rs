//! Core error types for schemaform-rs.
//!
//! [`FormError`] covers everything that can go wrong while *configuring* a
//! form: a schema that is not an object, a `$ref` that points nowhere,
//! malformed settings files. Validation failures are deliberately absent
//! here. They are ordinary data (error reports merged into form state) and
//! never travel through `Result`.

use thiserror::Error;

/// The primary error type for schemaform-rs.
///
/// Each variant maps to a short, stable diagnostic code via
/// [`FormError::code`], suitable for structured log fields.
#[derive(Error, Debug)]
pub enum FormError {
    // ── Schema ───────────────────────────────────────────────────────

    /// The supplied schema is not usable (not an object, wrong shape).
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A `$ref` could not be resolved against the schema definitions.
    #[error("Could not find a definition for {0}")]
    UnresolvedReference(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A deferred validation was produced outside of a Tokio runtime.
    #[error("No async runtime available: {0}")]
    RuntimeUnavailable(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FormError {
    /// Returns the diagnostic code associated with this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSchema(_) => "invalid_schema",
            Self::UnresolvedReference(_) => "unresolved_ref",
            Self::ConfigurationError(_) => "configuration",
            Self::RuntimeUnavailable(_) => "runtime_unavailable",
            Self::SerializationError(_) => "serialization",
            Self::IoError(_) => "io",
        }
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;
