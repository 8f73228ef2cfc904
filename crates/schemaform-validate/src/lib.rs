//! # schemaform-validate
//!
//! The validation side of the form engine. A [`ValidationAdapter`] turns form
//! data plus a schema into an [`ErrorReport`], either immediately
//! ([`Validation::Ready`]) or through a future ([`Validation::Deferred`]).
//! The form orchestrator treats both shapes uniformly.
//!
//! ## Modules
//!
//! - [`report`] - Error entries, the per-field error tree, and reports
//! - [`adapter`] - The adapter trait and the ready/deferred result type
//! - [`custom`] - Hooks for user-supplied (sync or async) validation rules
//! - [`schema_validator`] - The stock adapter, backed by the `jsonschema` crate

pub mod adapter;
pub mod custom;
pub mod report;
pub mod schema_validator;

pub use adapter::{DeferredReport, Validation, ValidationAdapter};
pub use custom::{AsyncCustomValidator, AsyncValidator, CustomValidation, CustomValidator};
pub use report::{ErrorEntry, ErrorReport, ErrorSchema, FieldPath};
pub use schema_validator::{JsonSchemaAdapter, TransformErrors};
