//! The submit event.

/// A submission request from the host.
///
/// The orchestrator always calls [`prevent_default`](Self::prevent_default)
/// so the host does not perform its own submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub const fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
