//! The "Validating..." indicator.

use serde::Serialize;

const VALIDATING_TEXT: &str = "Validating...";

/// Shown while a deferred validation is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadingMessage {
    pub text: String,
}

impl Default for LoadingMessage {
    fn default() -> Self {
        Self {
            text: VALIDATING_TEXT.to_string(),
        }
    }
}
