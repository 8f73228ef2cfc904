//! Deciding whether a re-render is needed.

use crate::props::FormProps;
use crate::state::FormState;

/// The props and state a view was last rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub props: FormProps,
    pub state: FormState,
}

/// Decides whether a new frame differs enough from the last one to render.
///
/// Implementations must be pure.
pub trait RenderGate: Send + Sync {
    /// `previous` is `None` before the first render.
    fn should_render(
        &self,
        previous: Option<&RenderFrame>,
        next_props: &FormProps,
        next_state: &FormState,
    ) -> bool;
}

/// Renders whenever props or state differ by value.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepCompareGate;

impl RenderGate for DeepCompareGate {
    fn should_render(
        &self,
        previous: Option<&RenderFrame>,
        next_props: &FormProps,
        next_state: &FormState,
    ) -> bool {
        previous.map_or(true, |frame| {
            frame.props != *next_props || frame.state != *next_state
        })
    }
}
