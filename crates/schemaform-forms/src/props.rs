//! Host-supplied configuration.
//!
//! [`FormProps`] is everything the host hands a form: the schema, the ui
//! schema, the data (if the host controls it), the behavioural flags, and
//! the HTML form attributes. The orchestrator never mutates props; each
//! update replaces them wholesale.

use serde::Serialize;
use serde_json::{json, Value};

use schemaform_core::{FormFlags, Settings};

/// Where the form's data comes from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "source", content = "data", rename_all = "snake_case")]
pub enum DataSource {
    /// The host supplies the data; the form is in edit mode.
    Controlled(Value),
    /// The form starts from schema defaults.
    #[default]
    Uncontrolled,
}

impl DataSource {
    /// Returns `true` if the host supplied the data.
    pub const fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled(_))
    }

    /// The supplied data, if any.
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Controlled(value) => Some(value),
            Self::Uncontrolled => None,
        }
    }
}

/// Attributes of the rendered `<form>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormAttributes {
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub name: Option<String>,
    pub method: Option<String>,
    pub target: Option<String>,
    pub action: Option<String>,
    pub autocomplete: Option<String>,
    pub enctype: Option<String>,
    pub accept_charset: Option<String>,
}

/// The complete configuration of one form.
///
/// # Examples
///
/// ```
/// use schemaform_forms::FormProps;
/// use serde_json::json;
///
/// let props = FormProps::new(json!({"type": "string"}))
///     .with_data(json!("hello"))
///     .live_validate(true);
/// assert!(props.data.is_controlled());
/// assert!(props.flags.live_validate);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormProps {
    pub schema: Value,
    pub ui_schema: Value,
    pub data: DataSource,
    pub flags: FormFlags,
    /// Prefix for derived field ids; `"root"` when unset.
    pub id_prefix: Option<String>,
    /// Arbitrary host data passed through to the field tree.
    pub form_context: Value,
    pub attributes: FormAttributes,
}

impl FormProps {
    /// Creates props for `schema` with no data and default flags.
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            ui_schema: json!({}),
            data: DataSource::Uncontrolled,
            flags: FormFlags::default(),
            id_prefix: None,
            form_context: json!({}),
            attributes: FormAttributes::default(),
        }
    }

    /// Creates props whose flags and id prefix come from `settings`.
    pub fn from_settings(schema: Value, settings: &Settings) -> Self {
        Self {
            flags: settings.flags,
            id_prefix: Some(settings.id_prefix.clone()),
            ..Self::new(schema)
        }
    }

    #[must_use]
    pub fn with_ui_schema(mut self, ui_schema: Value) -> Self {
        self.ui_schema = ui_schema;
        self
    }

    /// Supplies the data, putting the form in edit mode.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = DataSource::Controlled(data);
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: FormFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn live_validate(mut self, enabled: bool) -> Self {
        self.flags.live_validate = enabled;
        self
    }

    #[must_use]
    pub fn no_validate(mut self, disabled: bool) -> Self {
        self.flags.no_validate = disabled;
        self
    }

    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_form_context(mut self, context: Value) -> Self {
        self.form_context = context;
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: FormAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The root field id requested by the ui schema, if any.
    pub fn root_field_id(&self) -> Option<&str> {
        self.ui_schema.get("ui:rootFieldId").and_then(Value::as_str)
    }

    /// Whether the current data must be validated when state is derived.
    pub const fn must_validate(&self) -> bool {
        self.data.is_controlled() && self.flags.validates_live()
    }
}
