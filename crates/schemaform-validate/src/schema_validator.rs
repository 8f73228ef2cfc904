//! JSON Schema validation backed by the `jsonschema` crate.

use std::fmt;
use std::sync::Arc;

use jsonschema::Draft;
use serde_json::Value;
use tracing::{debug, warn};

use crate::adapter::{Validation, ValidationAdapter};
use crate::custom::{CustomValidation, CustomValidator};
use crate::report::{ErrorEntry, ErrorReport, ErrorSchema, FieldPath};

/// Rewrites schema errors before they are reported (to translate or
/// reword messages, or drop some).
pub type TransformErrors = Arc<dyn Fn(Vec<ErrorEntry>) -> Vec<ErrorEntry> + Send + Sync>;

/// The stock [`ValidationAdapter`].
///
/// Validates against the schema (Draft 7), applies the optional
/// [`TransformErrors`] hook, then runs the optional [`CustomValidator`] and
/// merges its errors into the tree. If the custom validator is deferred, the
/// whole validation is.
///
/// A schema that does not compile is reported as a single root-level error
/// rather than a failure, so the form can still render.
#[derive(Clone, Default)]
pub struct JsonSchemaAdapter {
    custom: Option<Arc<dyn CustomValidator>>,
    transform: Option<TransformErrors>,
}

impl JsonSchemaAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom validation rule.
    #[must_use]
    pub fn with_custom_validator(mut self, validator: impl CustomValidator + 'static) -> Self {
        self.custom = Some(Arc::new(validator));
        self
    }

    /// Adds a hook that rewrites schema errors.
    #[must_use]
    pub fn with_transform_errors<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<ErrorEntry>) -> Vec<ErrorEntry> + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    fn schema_errors(data: &Value, schema: &Value) -> Vec<ErrorEntry> {
        let validator = match jsonschema::options().with_draft(Draft::Draft7).build(schema) {
            Ok(validator) => validator,
            Err(e) => {
                warn!(error = %e, "schema failed to compile, reporting it as a form error");
                return vec![ErrorEntry::new(
                    FieldPath::root(),
                    format!("invalid schema: {e}"),
                )];
            }
        };
        validator
            .iter_errors(data)
            .map(|e| {
                ErrorEntry::new(
                    FieldPath::from_pointer(&e.instance_path.to_string()),
                    e.to_string(),
                )
            })
            .collect()
    }
}

impl fmt::Debug for JsonSchemaAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaAdapter")
            .field("custom", &self.custom.is_some())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl ValidationAdapter for JsonSchemaAdapter {
    fn validate(&self, data: &Value, schema: &Value) -> Validation {
        let mut entries = Self::schema_errors(data, schema);
        if let Some(transform) = &self.transform {
            entries = transform(entries);
        }
        debug!(count = entries.len(), "schema validation finished");

        let Some(custom) = &self.custom else {
            return Validation::Ready(ErrorReport::from_entries(entries));
        };

        let base = ErrorSchema::from_entries(&entries);
        match custom.validate(data, ErrorSchema::new()) {
            CustomValidation::Ready(user) => Validation::Ready(combine(base, user)),
            CustomValidation::Deferred(user) => {
                Validation::deferred(async move { combine(base, user.await) })
            }
        }
    }
}

fn combine(mut base: ErrorSchema, user: ErrorSchema) -> ErrorReport {
    base.merge(user);
    base.prune();
    ErrorReport::from_schema(base)
}
