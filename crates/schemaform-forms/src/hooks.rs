//! Optional observers fired by the orchestrator.
//!
//! Hooks are plain callbacks; an absent hook is a no-op. They receive
//! borrowed views of the state so the orchestrator stays the single owner.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use schemaform_validate::ErrorEntry;

use crate::state::FormState;

/// A blur or focus on a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEvent {
    /// The field id, as derived into the id schema.
    pub id: String,
    pub value: Value,
}

/// The outcome tag attached to a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    Submitted,
}

/// The finalized state handed to the submit hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedForm {
    #[serde(flatten)]
    pub state: FormState,
    pub status: SubmitStatus,
}

/// Callback receiving the state after a change has settled.
pub type StateHook = Arc<dyn Fn(&FormState) + Send + Sync>;

/// Callback receiving a blur or focus event.
pub type FieldHook = Arc<dyn Fn(&FieldEvent) + Send + Sync>;

/// Callback receiving a successful submission.
pub type SubmitHook = Arc<dyn Fn(&SubmittedForm) + Send + Sync>;

/// Callback receiving the errors of a failed submission.
pub type ErrorHook = Arc<dyn Fn(&[ErrorEntry]) + Send + Sync>;

/// The set of observers attached to a form.
///
/// # Examples
///
/// ```
/// use schemaform_forms::FormHooks;
///
/// let hooks = FormHooks::new()
///     .on_submit(|submitted| println!("submitted {}", submitted.state.data))
///     .on_error(|errors| eprintln!("{} errors", errors.len()));
/// assert!(hooks.has_error_hook());
/// ```
#[derive(Clone, Default)]
pub struct FormHooks {
    change: Option<StateHook>,
    blur: Option<FieldHook>,
    focus: Option<FieldHook>,
    submit: Option<SubmitHook>,
    error: Option<ErrorHook>,
}

impl FormHooks {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_change(mut self, hook: impl Fn(&FormState) + Send + Sync + 'static) -> Self {
        self.change = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_blur(mut self, hook: impl Fn(&FieldEvent) + Send + Sync + 'static) -> Self {
        self.blur = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_focus(mut self, hook: impl Fn(&FieldEvent) + Send + Sync + 'static) -> Self {
        self.focus = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_submit(mut self, hook: impl Fn(&SubmittedForm) + Send + Sync + 'static) -> Self {
        self.submit = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn on_error(mut self, hook: impl Fn(&[ErrorEntry]) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(hook));
        self
    }

    pub const fn has_error_hook(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn emit_change(&self, state: &FormState) {
        if let Some(hook) = &self.change {
            hook(state);
        }
    }

    pub(crate) fn emit_blur(&self, event: &FieldEvent) {
        if let Some(hook) = &self.blur {
            hook(event);
        }
    }

    pub(crate) fn emit_focus(&self, event: &FieldEvent) {
        if let Some(hook) = &self.focus {
            hook(event);
        }
    }

    pub(crate) fn emit_submit(&self, submitted: &SubmittedForm) {
        if let Some(hook) = &self.submit {
            hook(submitted);
        }
    }

    /// Returns `false` if no error hook is attached.
    pub(crate) fn emit_error(&self, errors: &[ErrorEntry]) -> bool {
        self.error.as_ref().map_or(false, |hook| {
            hook(errors);
            true
        })
    }
}

impl fmt::Debug for FormHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormHooks")
            .field("change", &self.change.is_some())
            .field("blur", &self.blur.is_some())
            .field("focus", &self.focus.is_some())
            .field("submit", &self.submit.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_absent_hooks_are_noops() {
        let hooks = FormHooks::new();
        hooks.emit_blur(&FieldEvent { id: "root_a".into(), value: json!(1) });
        assert!(!hooks.emit_error(&[]));
    }

    #[test]
    fn test_field_hooks_receive_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let blur_seen = Arc::clone(&seen);
        let focus_seen = Arc::clone(&seen);
        let hooks = FormHooks::new()
            .on_blur(move |e| blur_seen.lock().unwrap().push(format!("blur {}", e.id)))
            .on_focus(move |e| focus_seen.lock().unwrap().push(format!("focus {}", e.id)));

        hooks.emit_focus(&FieldEvent { id: "root_a".into(), value: json!("x") });
        hooks.emit_blur(&FieldEvent { id: "root_a".into(), value: json!("x") });
        assert_eq!(*seen.lock().unwrap(), ["focus root_a", "blur root_a"]);
    }

    #[test]
    fn test_error_hook_reports_presence() {
        let hooks = FormHooks::new().on_error(|_| {});
        assert!(hooks.has_error_hook());
        assert!(hooks.emit_error(&[]));
    }

    #[test]
    fn test_debug_lists_attached_hooks() {
        let hooks = FormHooks::new().on_change(|_| {});
        let debug = format!("{hooks:?}");
        assert!(debug.contains("change: true"));
        assert!(debug.contains("submit: false"));
    }
}
