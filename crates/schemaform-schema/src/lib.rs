//! # schemaform-schema
//!
//! Schema-side collaborators of the form engine. Given a JSON Schema, its
//! `definitions`, and the current form data, this crate produces:
//!
//! - the concrete schema, with `$ref` and `dependencies` resolved ([`resolve`]),
//! - the default form data implied by the schema, overlaid with supplied data ([`defaults`]),
//! - a stable id tree used to key rendered fields ([`ids`]).
//!
//! Each concern is exposed through a trait ([`SchemaResolver`],
//! [`IdentityDeriver`]) so hosts can substitute their own implementation;
//! [`DefaultSchemaResolver`] and [`DefaultIdentityDeriver`] are the stock ones.

pub mod defaults;
pub mod ids;
pub mod resolve;

pub use defaults::{compute_defaults, default_form_state, merge_objects};
pub use ids::{DefaultIdentityDeriver, IdSchema, IdentityDeriver};
pub use resolve::{
    definitions_of, find_schema_definition, retrieve_schema, DefaultSchemaResolver,
    SchemaResolver,
};
