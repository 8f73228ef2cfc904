//! Form state and the tokens that guard it against stale results.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use schemaform_schema::IdSchema;
use schemaform_validate::{ErrorEntry, ErrorReport, ErrorSchema};

use crate::props::FormProps;

/// A monotonically increasing token identifying the latest owner of the
/// error state.
///
/// Every derivation, and every change or submit that replaces the error
/// state, issues a new generation. A deferred validation result is applied
/// only if its generation is still the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    /// Returns the generation after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// An immutable capture of the props state was last derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct PropsSnapshot {
    generation: Generation,
    props: Arc<FormProps>,
}

impl PropsSnapshot {
    pub(crate) fn new(generation: Generation, props: FormProps) -> Self {
        Self {
            generation,
            props: Arc::new(props),
        }
    }

    /// The generation issued when this snapshot became current.
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    pub fn props(&self) -> &FormProps {
        &self.props
    }
}

/// The authoritative, render-ready state of a form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    /// The resolved schema (references and dependencies applied).
    pub schema: Value,
    pub ui_schema: Value,
    pub id_schema: IdSchema,
    /// The effective data: supplied data over schema defaults.
    pub data: Value,
    /// `true` when the host controls the data.
    pub edit: bool,
    /// The errors of the last accepted validation pass.
    pub report: ErrorReport,
    /// `true` while a deferred validation for the current generation is
    /// outstanding.
    pub pending_validation: bool,
}

impl FormState {
    pub fn errors(&self) -> &[ErrorEntry] {
        self.report.errors()
    }

    pub const fn error_schema(&self) -> &ErrorSchema {
        self.report.error_schema()
    }

    pub fn has_errors(&self) -> bool {
        !self.report.is_empty()
    }

    /// Compares everything except the pending flag.
    pub fn same_content(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.ui_schema == other.ui_schema
            && self.id_schema == other.id_schema
            && self.data == other.data
            && self.edit == other.edit
            && self.report == other.report
    }
}
