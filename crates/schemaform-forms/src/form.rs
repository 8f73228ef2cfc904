//! The form orchestrator.
//!
//! [`SchemaForm`] owns one form's [`FormState`] and is its only writer. It
//! turns host props into state, runs validation through the configured
//! [`ValidationAdapter`], and exposes the change, blur, focus, and submit
//! handlers.
//!
//! Validation can finish immediately or later. Immediate results are merged
//! inside the handler. Deferred results run on the Tokio runtime and are
//! merged only when the owner drives [`settle_next`](SchemaForm::settle_next)
//! or [`settle`](SchemaForm::settle), so all mutation stays on the owning
//! task and no locks guard the state.
//!
//! Every derivation, every submit, and every change that validates, applies
//! a local error tree or arrives while a validation is pending issues a new
//! [`Generation`]. A deferred result carries the generation it was started
//! under and is applied only if that generation is still current; otherwise
//! it is dropped. Whatever the completion order, only the newest request can
//! win, and a submission never lands on data edited after it started.
//!
//! Deferred results are only merged from `settle_next`. Hosts must poll it
//! from their event loop (or `select!` on it alongside their input), or
//! finished validations accumulate in the in-flight set and the pending
//! flag is never cleared.
//!
//! # Examples
//!
//! ```
//! use schemaform_forms::{FormProps, SchemaForm, SubmitEvent};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {"name": {"type": "string"}}
//! });
//! let mut form = SchemaForm::new(FormProps::new(schema)).unwrap();
//!
//! let mut event = SubmitEvent::new();
//! form.on_submit(&mut event);
//! assert!(event.default_prevented());
//! assert_eq!(form.state().errors().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use schemaform_core::logging::form_span;
use schemaform_core::{FormError, FormResult};
use schemaform_schema::{
    definitions_of, DefaultIdentityDeriver, DefaultSchemaResolver, IdentityDeriver,
    SchemaResolver,
};
use schemaform_validate::{
    ErrorEntry, ErrorReport, ErrorSchema, JsonSchemaAdapter, Validation, ValidationAdapter,
};

use crate::event::SubmitEvent;
use crate::hooks::{FieldEvent, FormHooks, SubmitStatus, SubmittedForm};
use crate::props::FormProps;
use crate::render_gate::{DeepCompareGate, RenderFrame, RenderGate};
use crate::state::{FormState, Generation, PropsSnapshot};
use crate::view::FormView;

const DEFAULT_ID_PREFIX: &str = "root";

/// Why a validation was started; decides what happens when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Purpose {
    Derive,
    Change,
    Submit,
}

#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: Generation,
    purpose: Purpose,
}

type InFlight = JoinSet<(Ticket, Result<ErrorReport, JoinError>)>;

/// What happened to one deferred validation when it was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result was current and merged into the state.
    Applied(Generation),
    /// A newer generation superseded it; the result was dropped.
    Stale(Generation),
    /// The validation panicked; the pending flag was cleared.
    Failed(Generation),
}

/// The orchestrator for a single form.
///
/// Deferred validations are merged only when the owner polls
/// [`settle_next`](Self::settle_next). Hosts must poll it from their event
/// loop; a form that is never settled keeps finished tasks in its in-flight
/// set and stays pending.
pub struct SchemaForm {
    snapshot: PropsSnapshot,
    state: FormState,
    generation: Generation,
    resolver: Arc<dyn SchemaResolver>,
    ids: Arc<dyn IdentityDeriver>,
    adapter: Arc<dyn ValidationAdapter>,
    gate: Arc<dyn RenderGate>,
    hooks: FormHooks,
    in_flight: InFlight,
    last_frame: Option<RenderFrame>,
}

/// Configures the collaborators of a [`SchemaForm`].
///
/// Every collaborator has a stock default: [`DefaultSchemaResolver`],
/// [`DefaultIdentityDeriver`], [`JsonSchemaAdapter`], and [`DeepCompareGate`].
pub struct SchemaFormBuilder {
    props: FormProps,
    resolver: Arc<dyn SchemaResolver>,
    ids: Arc<dyn IdentityDeriver>,
    adapter: Arc<dyn ValidationAdapter>,
    gate: Arc<dyn RenderGate>,
    hooks: FormHooks,
}

impl SchemaFormBuilder {
    #[must_use]
    pub fn resolver(mut self, resolver: impl SchemaResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    #[must_use]
    pub fn identity_deriver(mut self, deriver: impl IdentityDeriver + 'static) -> Self {
        self.ids = Arc::new(deriver);
        self
    }

    #[must_use]
    pub fn adapter(mut self, adapter: impl ValidationAdapter + 'static) -> Self {
        self.adapter = Arc::new(adapter);
        self
    }

    /// Shares one adapter between several forms.
    #[must_use]
    pub fn shared_adapter(mut self, adapter: Arc<dyn ValidationAdapter>) -> Self {
        self.adapter = adapter;
        self
    }

    #[must_use]
    pub fn render_gate(mut self, gate: impl RenderGate + 'static) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: FormHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Derives the initial state.
    ///
    /// # Errors
    ///
    /// Fails if the schema cannot be resolved, or if the initial validation
    /// is deferred and no Tokio runtime is running.
    pub fn build(self) -> FormResult<SchemaForm> {
        let state = derive_state(&*self.resolver, &*self.ids, &self.props, ErrorReport::empty())?;
        let generation = Generation::default().next();
        let must_validate = self.props.must_validate();

        let mut form = SchemaForm {
            snapshot: PropsSnapshot::new(generation, self.props),
            state,
            generation,
            resolver: self.resolver,
            ids: self.ids,
            adapter: self.adapter,
            gate: self.gate,
            hooks: self.hooks,
            in_flight: JoinSet::new(),
            last_frame: None,
        };
        let span = form.span();
        let _guard = span.enter();
        debug!(%generation, edit = form.state.edit, "derived initial form state");
        if must_validate {
            form.validate(generation, Purpose::Derive)?;
        }
        Ok(form)
    }
}

impl fmt::Debug for SchemaFormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaFormBuilder")
            .field("props", &self.props)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl SchemaForm {
    pub fn builder(props: FormProps) -> SchemaFormBuilder {
        SchemaFormBuilder {
            props,
            resolver: Arc::new(DefaultSchemaResolver),
            ids: Arc::new(DefaultIdentityDeriver),
            adapter: Arc::new(JsonSchemaAdapter::new()),
            gate: Arc::new(DeepCompareGate),
            hooks: FormHooks::default(),
        }
    }

    /// Creates a form with the stock collaborators and no hooks.
    ///
    /// # Errors
    ///
    /// See [`SchemaFormBuilder::build`].
    pub fn new(props: FormProps) -> FormResult<Self> {
        Self::builder(props).build()
    }

    pub const fn state(&self) -> &FormState {
        &self.state
    }

    /// The props the current state was derived from.
    pub fn props(&self) -> &FormProps {
        self.snapshot.props()
    }

    pub const fn snapshot(&self) -> &PropsSnapshot {
        &self.snapshot
    }

    /// The newest generation issued.
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a deferred validation for the current generation is pending.
    pub const fn is_validating(&self) -> bool {
        self.state.pending_validation
    }

    /// Number of deferred validations not yet settled, stale ones included.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Replaces the props and re-derives the state.
    ///
    /// The new props become current before validation starts, superseding
    /// any deferred validation still in flight. Without validation the
    /// previous errors are carried forward.
    ///
    /// # Errors
    ///
    /// If the schema cannot be resolved the previous props and state stay
    /// current. A deferred validation without a running Tokio runtime returns
    /// [`FormError::RuntimeUnavailable`] after the new state is committed.
    pub fn set_props(&mut self, props: FormProps) -> FormResult<()> {
        let span = self.span();
        let _guard = span.enter();

        let carried = self.state.report.clone();
        let state = derive_state(&*self.resolver, &*self.ids, &props, carried)?;
        let must_validate = props.must_validate();

        let generation = self.advance();
        self.snapshot = PropsSnapshot::new(generation, props);
        self.state = state;
        debug!(%generation, edit = self.state.edit, must_validate, "derived form state");

        if must_validate {
            self.validate(generation, Purpose::Derive)?;
        }
        Ok(())
    }

    /// Handles new data from the field tree.
    ///
    /// With live validation the data is validated; otherwise a field-local
    /// error tree, if given, becomes the error state as is. The change hook
    /// fires once the outcome is known, which for a deferred validation is
    /// when it is settled.
    ///
    /// Any change supersedes a deferred validation still in flight, so a
    /// pending submission never lands on data it did not validate.
    pub fn on_change(&mut self, data: Value, local_errors: Option<ErrorSchema>) {
        let span = self.span();
        let _guard = span.enter();

        self.state.data = data;
        self.reshape();

        let flags = self.snapshot.props().flags;
        if flags.validates_live() {
            let generation = self.advance();
            if let Err(e) = self.validate(generation, Purpose::Change) {
                error!(error = %e, "could not start change validation");
            }
        } else if let Some(local) = local_errors.filter(|_| !flags.no_validate) {
            let generation = self.advance();
            debug!(%generation, "applying field-local errors");
            self.state.report = ErrorReport::from_schema(local);
            self.state.pending_validation = false;
            self.hooks.emit_change(&self.state);
        } else {
            if self.state.pending_validation {
                let generation = self.advance();
                debug!(%generation, "edit superseded pending validation");
                self.state.pending_validation = false;
            }
            self.hooks.emit_change(&self.state);
        }
    }

    /// Forwards a field blur to the blur hook.
    pub fn on_blur(&self, id: impl Into<String>, value: Value) {
        self.hooks.emit_blur(&FieldEvent {
            id: id.into(),
            value,
        });
    }

    /// Forwards a field focus to the focus hook.
    pub fn on_focus(&self, id: impl Into<String>, value: Value) {
        self.hooks.emit_focus(&FieldEvent {
            id: id.into(),
            value,
        });
    }

    /// Handles a submission.
    ///
    /// The host's default action is always prevented. With validation
    /// disabled nothing else happens: no hook fires and the error state is
    /// left as is. Otherwise the current data is validated whatever the
    /// live-validation setting; errors go to the error hook (or the log), a
    /// clean pass clears the errors and fires the submit hook. A deferred
    /// validation defers the hooks until it is settled.
    pub fn on_submit(&mut self, event: &mut SubmitEvent) {
        event.prevent_default();
        if self.snapshot.props().flags.no_validate {
            return;
        }
        let span = self.span();
        let _guard = span.enter();

        let generation = self.advance();
        if let Err(e) = self.validate(generation, Purpose::Submit) {
            error!(error = %e, "could not start submit validation");
        }
    }

    /// Waits for the next deferred validation and merges it if current.
    ///
    /// Returns `None` once nothing is in flight.
    pub async fn settle_next(&mut self) -> Option<Settlement> {
        loop {
            match self.in_flight.join_next().await? {
                Ok((ticket, outcome)) => return Some(self.land(ticket, outcome)),
                Err(e) => error!(error = %e, "validation task was lost"),
            }
        }
    }

    /// Settles every deferred validation in flight.
    pub async fn settle(&mut self) {
        while self.settle_next().await.is_some() {}
    }

    /// Renders the current state.
    pub fn render(&self) -> FormView {
        FormView::build(self.snapshot.props(), &self.state)
    }

    /// Renders only if the render gate reports a change since the last
    /// frame taken.
    pub fn take_render(&mut self) -> Option<FormView> {
        let props = self.snapshot.props();
        if !self.gate.should_render(self.last_frame.as_ref(), props, &self.state) {
            return None;
        }
        let view = FormView::build(props, &self.state);
        self.last_frame = Some(RenderFrame {
            props: props.clone(),
            state: self.state.clone(),
        });
        Some(view)
    }

    /// Issues the next generation and records it on the entered form span.
    fn advance(&mut self) -> Generation {
        self.generation = self.generation.next();
        tracing::Span::current().record("generation", self.generation.value());
        self.generation
    }

    fn span(&self) -> tracing::Span {
        let props = self.snapshot.props();
        let id = props
            .attributes
            .id
            .as_deref()
            .or_else(|| props.root_field_id())
            .or(props.id_prefix.as_deref())
            .unwrap_or(DEFAULT_ID_PREFIX);
        let span = form_span(id);
        span.record("generation", self.generation.value());
        span
    }

    /// Re-resolves the schema and ids against the current data.
    fn reshape(&mut self) {
        let props = self.snapshot.props();
        let definitions = definitions_of(&props.schema);
        let data = &self.state.data;
        let shaped = self
            .resolver
            .resolve_schema(&props.schema, &definitions, data)
            .and_then(|schema| {
                let ids = self.ids.derive_ids(
                    &schema,
                    props.root_field_id(),
                    &definitions,
                    data,
                    props.id_prefix.as_deref().unwrap_or(DEFAULT_ID_PREFIX),
                )?;
                Ok((schema, ids))
            });
        match shaped {
            Ok((schema, ids)) => {
                self.state.schema = schema;
                self.state.id_schema = ids;
            }
            Err(e) => warn!(error = %e, "keeping previous schema shape"),
        }
    }

    fn validate(&mut self, generation: Generation, purpose: Purpose) -> FormResult<()> {
        match self
            .adapter
            .validate(&self.state.data, &self.snapshot.props().schema)
        {
            Validation::Ready(report) => {
                debug!(%generation, ?purpose, errors = report.errors().len(), "validation finished");
                self.accept(purpose, report);
                Ok(())
            }
            Validation::Deferred(future) => {
                let Ok(handle) = Handle::try_current() else {
                    self.state.pending_validation = false;
                    return Err(FormError::RuntimeUnavailable(
                        "deferred validation needs a Tokio runtime".to_string(),
                    ));
                };
                debug!(%generation, ?purpose, "validation deferred");
                self.state.pending_validation = true;
                let ticket = Ticket {
                    generation,
                    purpose,
                };
                self.in_flight
                    .spawn_on(async move { (ticket, tokio::spawn(future).await) }, &handle);
                Ok(())
            }
        }
    }

    fn land(&mut self, ticket: Ticket, outcome: Result<ErrorReport, JoinError>) -> Settlement {
        let span = self.span();
        let _guard = span.enter();

        if ticket.generation != self.generation {
            debug!(
                stale = %ticket.generation,
                current = %self.generation,
                purpose = ?ticket.purpose,
                "discarding superseded validation result"
            );
            return Settlement::Stale(ticket.generation);
        }
        match outcome {
            Ok(report) => {
                debug!(
                    generation = %ticket.generation,
                    purpose = ?ticket.purpose,
                    errors = report.errors().len(),
                    "deferred validation settled"
                );
                self.accept(ticket.purpose, report);
                Settlement::Applied(ticket.generation)
            }
            Err(e) => {
                error!(generation = %ticket.generation, error = %e, "deferred validation failed");
                self.state.pending_validation = false;
                Settlement::Failed(ticket.generation)
            }
        }
    }

    fn accept(&mut self, purpose: Purpose, report: ErrorReport) {
        self.state.pending_validation = false;
        match purpose {
            Purpose::Derive => self.state.report = report,
            Purpose::Change => {
                self.state.report = report;
                self.hooks.emit_change(&self.state);
            }
            Purpose::Submit => self.finish_submit(report),
        }
    }

    fn finish_submit(&mut self, report: ErrorReport) {
        if report.is_empty() {
            self.state.report = ErrorReport::empty();
            info!("form submitted");
            self.hooks.emit_submit(&SubmittedForm {
                state: self.state.clone(),
                status: SubmitStatus::Submitted,
            });
            return;
        }
        self.state.report = report;
        if !self.hooks.emit_error(self.state.errors()) {
            let stacks: Vec<String> = self.state.errors().iter().map(ErrorEntry::stack).collect();
            error!(errors = ?stacks, "form validation failed");
        }
    }
}

impl fmt::Debug for SchemaForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaForm")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .field("in_flight", &self.in_flight.len())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

fn derive_state(
    resolver: &dyn SchemaResolver,
    ids: &dyn IdentityDeriver,
    props: &FormProps,
    report: ErrorReport,
) -> FormResult<FormState> {
    let definitions = definitions_of(&props.schema);
    let data = resolver.resolve_default_data(&props.schema, props.data.value(), &definitions)?;
    let schema = resolver.resolve_schema(&props.schema, &definitions, &data)?;
    let id_schema = ids.derive_ids(
        &schema,
        props.root_field_id(),
        &definitions,
        &data,
        props.id_prefix.as_deref().unwrap_or(DEFAULT_ID_PREFIX),
    )?;
    Ok(FormState {
        schema,
        ui_schema: props.ui_schema.clone(),
        id_schema,
        data,
        edit: props.data.is_controlled(),
        report,
        pending_validation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaform_validate::FieldPath;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn person_schema() -> Value {
        json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "default": "anon"},
                "age": {"type": "integer", "minimum": 0}
            }
        })
    }

    async fn explode() -> ErrorReport {
        panic!("validator exploded")
    }

    fn report_at(field: &str, message: &str) -> ErrorReport {
        ErrorReport::from_entries(vec![ErrorEntry::new(
            FieldPath::from_segments([field]),
            message,
        )])
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    #[test]
    fn test_uncontrolled_uses_defaults() {
        let form = SchemaForm::new(FormProps::new(person_schema())).unwrap();
        assert!(!form.state().edit);
        assert_eq!(form.state().data, json!({"name": "anon"}));
        assert_eq!(form.state().id_schema.child("age").unwrap().id, "root_age");
        assert_eq!(form.generation().value(), 1);
    }

    #[test]
    fn test_controlled_without_live_validation_skips_adapter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let form = SchemaForm::builder(FormProps::new(person_schema()).with_data(json!({"age": -4})))
            .adapter(move |_: &Value, _: &Value| {
                counter.fetch_add(1, Ordering::SeqCst);
                Validation::Ready(ErrorReport::empty())
            })
            .build()
            .unwrap();
        assert!(form.state().edit);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(form.state().errors().is_empty());
    }

    #[test]
    fn test_live_validation_on_derive() {
        let props = FormProps::new(person_schema())
            .with_data(json!({"age": -4}))
            .live_validate(true);
        let form = SchemaForm::new(props).unwrap();
        assert_eq!(form.state().errors().len(), 1);
        assert_eq!(form.state().errors()[0].source_field, "age");
        assert!(!form.is_validating());
    }

    #[test]
    fn test_errors_carried_forward_without_validation() {
        let props = FormProps::new(person_schema())
            .with_data(json!({"age": -4}))
            .live_validate(true);
        let mut form = SchemaForm::new(props.clone()).unwrap();
        assert_eq!(form.state().errors().len(), 1);

        form.set_props(props.live_validate(false)).unwrap();
        assert_eq!(form.state().errors().len(), 1);
        assert_eq!(form.generation().value(), 2);
    }

    #[test]
    fn test_failed_derivation_keeps_previous_state() {
        let mut form = SchemaForm::new(FormProps::new(person_schema())).unwrap();
        let before = form.state().clone();
        let snapshot = form.snapshot().clone();

        let err = form.set_props(FormProps::new(json!("not a schema"))).unwrap_err();
        assert!(matches!(err, FormError::InvalidSchema(_)));
        assert_eq!(form.state(), &before);
        assert_eq!(form.snapshot(), &snapshot);
    }

    #[test]
    fn test_root_field_id_and_prefix() {
        let props = FormProps::new(person_schema()).with_id_prefix("person");
        let form = SchemaForm::new(props.clone()).unwrap();
        assert_eq!(form.state().id_schema.id, "person");

        let form = SchemaForm::new(props.with_ui_schema(json!({"ui:rootFieldId": "who"}))).unwrap();
        assert_eq!(form.state().id_schema.child("name").unwrap().id, "who_name");
    }

    #[test]
    fn test_deferred_without_runtime_is_reported() {
        let props = FormProps::new(person_schema())
            .with_data(json!({}))
            .live_validate(true);
        let err = SchemaForm::builder(props)
            .adapter(|_: &Value, _: &Value| Validation::deferred(async { ErrorReport::empty() }))
            .build()
            .unwrap_err();
        assert!(matches!(err, FormError::RuntimeUnavailable(_)));
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    #[test]
    fn test_change_with_local_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut form = SchemaForm::builder(FormProps::new(person_schema()))
            .hooks(FormHooks::new().on_change(move |s| sink.lock().unwrap().push(s.errors().len())))
            .build()
            .unwrap();

        let mut local = ErrorSchema::new();
        local.child("name").add_error("taken");
        form.on_change(json!({"name": "bob"}), Some(local.clone()));

        assert_eq!(form.state().error_schema(), &local);
        assert_eq!(form.state().data, json!({"name": "bob"}));
        assert_eq!(*seen.lock().unwrap(), [1]);
    }

    #[test]
    fn test_change_local_errors_ignored_when_validation_disabled() {
        let mut form = SchemaForm::new(FormProps::new(person_schema()).no_validate(true)).unwrap();
        let mut local = ErrorSchema::new();
        local.add_error("ignored");
        form.on_change(json!({"name": "x"}), Some(local));
        assert!(form.state().errors().is_empty());
        assert_eq!(form.generation().value(), 1);
    }

    #[test]
    fn test_submit_without_validation_only_prevents_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let submit_calls = Arc::clone(&calls);
        let error_calls = Arc::clone(&calls);
        let mut form = SchemaForm::builder(FormProps::new(person_schema()).no_validate(true))
            .hooks(
                FormHooks::new()
                    .on_submit(move |_| {
                        submit_calls.fetch_add(1, Ordering::SeqCst);
                    })
                    .on_error(move |_| {
                        error_calls.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .build()
            .unwrap();
        form.on_change(json!({"age": -1}), None);
        let before = form.state().clone();
        let generation = form.generation();

        let mut event = SubmitEvent::new();
        form.on_submit(&mut event);
        assert!(event.default_prevented());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.state(), &before);
        assert_eq!(form.generation(), generation);
    }

    #[test]
    fn test_submit_errors_without_error_hook_block_success() {
        let submitted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&submitted);
        let mut form = SchemaForm::builder(FormProps::new(person_schema()))
            .hooks(FormHooks::new().on_submit(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .build()
            .unwrap();
        form.on_change(json!({"name": 3}), None);
        form.on_submit(&mut SubmitEvent::new());
        assert_eq!(form.state().errors().len(), 1);
        assert_eq!(submitted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_blur_and_focus_forwarded() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let blur_sink = Arc::clone(&seen);
        let focus_sink = Arc::clone(&seen);
        let form = SchemaForm::builder(FormProps::new(person_schema()))
            .hooks(
                FormHooks::new()
                    .on_blur(move |e| blur_sink.lock().unwrap().push(("blur", e.id.clone())))
                    .on_focus(move |e| focus_sink.lock().unwrap().push(("focus", e.id.clone()))),
            )
            .build()
            .unwrap();
        form.on_focus("root_name", json!("a"));
        form.on_blur("root_name", json!("ab"));
        assert_eq!(
            *seen.lock().unwrap(),
            [("focus", "root_name".to_string()), ("blur", "root_name".to_string())]
        );
    }

    #[test]
    fn test_change_reshapes_dependencies() {
        let schema = json!({
            "type": "object",
            "properties": {"card": {"type": "boolean"}},
            "dependencies": {"card": {"properties": {"number": {"type": "string"}}}}
        });
        let mut form = SchemaForm::new(FormProps::new(schema)).unwrap();
        assert!(form.state().id_schema.child("number").is_none());

        form.on_change(json!({"card": true}), None);
        assert_eq!(form.state().id_schema.child("number").unwrap().id, "root_number");
    }

    // ========================================================================
    // Deferred results
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_deferred_change_sets_pending_then_applies() {
        let props = FormProps::new(person_schema()).live_validate(true);
        let mut form = SchemaForm::builder(props)
            .adapter(|_: &Value, _: &Value| {
                Validation::deferred(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    report_at("name", "slow")
                })
            })
            .build()
            .unwrap();

        form.on_change(json!({"name": "x"}), None);
        assert!(form.is_validating());
        assert!(form.state().errors().is_empty());

        let settled = form.settle_next().await;
        assert_eq!(settled, Some(Settlement::Applied(form.generation())));
        assert!(!form.is_validating());
        assert_eq!(form.state().errors()[0].message, "slow");
        assert_eq!(form.settle_next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_derivation_supersedes_pending_change() {
        let props = FormProps::new(person_schema()).live_validate(true);
        let mut form = SchemaForm::builder(props.clone())
            .adapter(|_: &Value, _: &Value| {
                Validation::deferred(async { report_at("name", "late") })
            })
            .build()
            .unwrap();

        form.on_change(json!({"name": "x"}), None);
        assert!(form.is_validating());
        form.set_props(props.live_validate(false)).unwrap();
        assert!(!form.is_validating());

        let settled = form.settle_next().await.unwrap();
        assert!(matches!(settled, Settlement::Stale(_)));
        assert!(form.state().errors().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_validation_clears_pending() {
        let props = FormProps::new(person_schema()).live_validate(true);
        let mut form = SchemaForm::builder(props)
            .adapter(|_: &Value, _: &Value| {
                Validation::deferred(explode())
            })
            .build()
            .unwrap();

        form.on_change(json!({"name": "x"}), None);
        assert!(form.is_validating());
        let settled = form.settle_next().await.unwrap();
        assert!(matches!(settled, Settlement::Failed(_)));
        assert!(!form.is_validating());
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    #[test]
    fn test_take_render_gated() {
        let mut form = SchemaForm::new(FormProps::new(person_schema())).unwrap();
        assert!(form.take_render().is_some());
        assert!(form.take_render().is_none());

        form.on_change(json!({"name": "new"}), None);
        let view = form.take_render().unwrap();
        assert_eq!(view.root_field.data, json!({"name": "new"}));
        assert!(form.take_render().is_none());
    }

    #[test]
    fn test_equal_errors_do_not_rerender() {
        let mut form = SchemaForm::new(FormProps::new(person_schema())).unwrap();
        let mut local = ErrorSchema::new();
        local.child("name").add_error("taken");

        form.on_change(json!({"name": "bob"}), Some(local.clone()));
        assert!(form.take_render().is_some());
        form.on_change(json!({"name": "bob"}), Some(local));
        assert!(form.take_render().is_none());
    }
}
