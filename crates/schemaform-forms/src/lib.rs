//! # schemaform-forms
//!
//! The form orchestrator. A [`SchemaForm`] owns the authoritative
//! [`FormState`] for one form: it derives render-ready state from the host's
//! [`FormProps`], decides when validation runs, merges synchronous and
//! deferred validation results without races, and drives the change, blur,
//! focus, and submit lifecycle.
//!
//! ## Modules
//!
//! - [`props`] - Host-supplied configuration
//! - [`state`] - Form state, generations, and props snapshots
//! - [`hooks`] - Optional observers fired by the orchestrator
//! - [`event`] - The submit event
//! - [`render_gate`] - Deciding whether a re-render is needed
//! - [`indicator`] - The "Validating..." indicator
//! - [`view`] - Render output
//! - [`form`] - The orchestrator itself

pub mod event;
pub mod form;
pub mod hooks;
pub mod indicator;
pub mod props;
pub mod render_gate;
pub mod state;
pub mod view;

pub use event::SubmitEvent;
pub use form::{SchemaForm, SchemaFormBuilder, Settlement};
pub use hooks::{FieldEvent, FormHooks, SubmitStatus, SubmittedForm};
pub use indicator::LoadingMessage;
pub use props::{DataSource, FormAttributes, FormProps};
pub use render_gate::{DeepCompareGate, RenderFrame, RenderGate};
pub use state::{FormState, Generation, PropsSnapshot};
pub use view::{FieldProps, FormView, Registry, RenderedAttributes};
