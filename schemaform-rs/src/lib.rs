//! # schemaform-rs
//!
//! A schema-driven form state engine for Rust.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `schemaform-rs` to get the whole engine, or depend on
//! individual crates for finer-grained control.

/// Settings, logging, and error types.
pub use schemaform_core as core;

/// Default data, schema resolution, and field ids.
#[cfg(feature = "schema")]
pub use schemaform_schema as schema;

/// Error reports and validation adapters.
#[cfg(feature = "validate")]
pub use schemaform_validate as validate;

/// The form orchestrator.
#[cfg(feature = "forms")]
pub use schemaform_forms as forms;

// Third-party re-exports
pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// The types most applications need.
#[cfg(feature = "forms")]
pub mod prelude {
    pub use schemaform_core::{FormError, FormFlags, FormResult, Settings};
    pub use schemaform_forms::{
        DataSource, FormHooks, FormProps, FormView, SchemaForm, Settlement, SubmitEvent,
        SubmitStatus,
    };
    pub use schemaform_validate::{
        AsyncCustomValidator, AsyncValidator, ErrorEntry, ErrorReport, ErrorSchema,
        JsonSchemaAdapter, Validation, ValidationAdapter,
    };
}

#[cfg(all(test, feature = "full"))]
mod tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn test_prelude_builds_a_form() {
        let form = SchemaForm::new(FormProps::new(json!({"type": "string", "default": "hi"})))
            .unwrap();
        assert_eq!(form.state().data, json!("hi"));
        assert_eq!(form.render().attributes.class_name, "schemaform");
    }
}
