//! Render output.
//!
//! A [`FormView`] is a plain value describing one rendered frame: the form
//! element's attributes, the error summary, the validating indicator, and the
//! props handed to the root field of the field tree. Hosts map it onto
//! whatever widget toolkit they use.

use serde::Serialize;
use serde_json::Value;

use schemaform_schema::{definitions_of, IdSchema};
use schemaform_validate::{ErrorEntry, ErrorSchema};

use crate::indicator::LoadingMessage;
use crate::props::FormProps;
use crate::state::FormState;

const DEFAULT_CLASS: &str = "schemaform";

/// Attributes of the `<form>` element as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedAttributes {
    pub class_name: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub method: Option<String>,
    pub target: Option<String>,
    pub action: Option<String>,
    pub autocomplete: Option<String>,
    pub enctype: Option<String>,
    pub accept_charset: Option<String>,
    /// Disables the host's own validation of the form element.
    pub no_validate: bool,
}

/// Shared context available to every field in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registry {
    pub definitions: Value,
    pub form_context: Value,
}

/// Props for the root field of the field tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldProps {
    pub schema: Value,
    pub ui_schema: Value,
    pub error_schema: ErrorSchema,
    pub id_schema: IdSchema,
    pub data: Value,
    pub safe_render_completion: bool,
    pub registry: Registry,
}

/// One rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub attributes: RenderedAttributes,
    /// The error summary; `None` when there is nothing to show or it is hidden.
    pub error_list: Option<Vec<ErrorEntry>>,
    pub loading: Option<LoadingMessage>,
    pub root_field: FieldProps,
}

impl FormView {
    pub(crate) fn build(props: &FormProps, state: &FormState) -> Self {
        let flags = &props.flags;
        let attrs = &props.attributes;

        let error_list = (flags.show_error_list && !state.pending_validation && state.has_errors())
            .then(|| state.errors().to_vec());
        let loading = (flags.render_validating_message && state.pending_validation)
            .then(LoadingMessage::default);

        Self {
            attributes: RenderedAttributes {
                class_name: attrs
                    .class_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CLASS.to_string()),
                id: attrs.id.clone(),
                name: attrs.name.clone(),
                method: attrs.method.clone(),
                target: attrs.target.clone(),
                action: attrs.action.clone(),
                autocomplete: attrs.autocomplete.clone(),
                enctype: attrs.enctype.clone(),
                accept_charset: attrs.accept_charset.clone(),
                no_validate: flags.no_html5_validate,
            },
            error_list,
            loading,
            root_field: FieldProps {
                schema: state.schema.clone(),
                ui_schema: state.ui_schema.clone(),
                error_schema: state.error_schema().clone(),
                id_schema: state.id_schema.clone(),
                data: state.data.clone(),
                safe_render_completion: flags.safe_render_completion,
                registry: Registry {
                    definitions: definitions_of(&props.schema),
                    form_context: props.form_context.clone(),
                },
            },
        }
    }
}
