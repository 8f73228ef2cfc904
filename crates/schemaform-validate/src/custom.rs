//! User-supplied validation rules.
//!
//! A [`CustomValidator`] receives the form data and an empty
//! [`ErrorSchema`], adds messages to the fields it checks, and hands the tree
//! back. Rules that need to wait (a server round-trip, a slow lookup)
//! implement [`AsyncCustomValidator`] and are wrapped in [`AsyncValidator`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::report::ErrorSchema;

/// The answer of a [`CustomValidator`].
pub enum CustomValidation {
    /// The rule has finished.
    Ready(ErrorSchema),
    /// The rule finishes when the future does.
    Deferred(Pin<Box<dyn Future<Output = ErrorSchema> + Send + 'static>>),
}

impl fmt::Debug for CustomValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(errors) => f.debug_tuple("Ready").field(errors).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// A validation rule layered on top of schema validation.
///
/// Plain closures `Fn(&Value, ErrorSchema) -> ErrorSchema` implement this
/// trait:
///
/// ```
/// use schemaform_validate::{CustomValidator, CustomValidation, ErrorSchema};
/// use serde_json::{json, Value};
///
/// let rule = |data: &Value, mut errors: ErrorSchema| {
///     if data["pass1"] != data["pass2"] {
///         errors.child("pass2").add_error("Passwords don't match.");
///     }
///     errors
/// };
/// let CustomValidation::Ready(errors) = rule.validate(&json!({"pass1": "a", "pass2": "b"}), ErrorSchema::new()) else {
///     unreachable!()
/// };
/// assert!(!errors.is_empty());
/// ```
pub trait CustomValidator: Send + Sync {
    /// Checks `data`, recording failures in `errors`.
    fn validate(&self, data: &Value, errors: ErrorSchema) -> CustomValidation;
}

impl<F> CustomValidator for F
where
    F: Fn(&Value, ErrorSchema) -> ErrorSchema + Send + Sync,
{
    fn validate(&self, data: &Value, errors: ErrorSchema) -> CustomValidation {
        CustomValidation::Ready(self(data, errors))
    }
}

/// A validation rule that completes asynchronously.
#[async_trait]
pub trait AsyncCustomValidator: Send + Sync + 'static {
    /// Checks `data`, recording failures in `errors`.
    async fn validate(&self, data: Value, errors: ErrorSchema) -> ErrorSchema;
}

/// Adapts an [`AsyncCustomValidator`] into a [`CustomValidator`] whose
/// answers are always deferred.
pub struct AsyncValidator<V> {
    inner: Arc<V>,
}

impl<V: AsyncCustomValidator> AsyncValidator<V> {
    pub fn new(validator: V) -> Self {
        Self {
            inner: Arc::new(validator),
        }
    }
}

impl<V> fmt::Debug for AsyncValidator<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValidator").finish_non_exhaustive()
    }
}

impl<V: AsyncCustomValidator> CustomValidator for AsyncValidator<V> {
    fn validate(&self, data: &Value, errors: ErrorSchema) -> CustomValidation {
        let inner = Arc::clone(&self.inner);
        let data = data.clone();
        CustomValidation::Deferred(Box::pin(async move { inner.validate(data, errors).await }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    struct SlowPasswordsMatch;

    #[async_trait]
    impl AsyncCustomValidator for SlowPasswordsMatch {
        async fn validate(&self, data: Value, mut errors: ErrorSchema) -> ErrorSchema {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            if data["pass1"] != data["pass2"] {
                errors.child("pass2").add_error("Passwords don't match.");
            }
            errors
        }
    }

    #[test]
    fn test_closure_validator_is_ready() {
        let rule = |_: &Value, mut errors: ErrorSchema| {
            errors.add_error("always");
            errors
        };
        match rule.validate(&json!({}), ErrorSchema::new()) {
            CustomValidation::Ready(errors) => assert_eq!(errors.errors(), ["always"]),
            CustomValidation::Deferred(_) => panic!("expected ready"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_validator_is_deferred() {
        let validator = AsyncValidator::new(SlowPasswordsMatch);
        let CustomValidation::Deferred(future) =
            validator.validate(&json!({"pass1": "a", "pass2": "b"}), ErrorSchema::new())
        else {
            panic!("expected deferred");
        };
        let errors = future.await;
        assert_eq!(errors.get("pass2").unwrap().errors(), ["Passwords don't match."]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_validator_passes_matching_data() {
        let validator = AsyncValidator::new(SlowPasswordsMatch);
        let CustomValidation::Deferred(future) =
            validator.validate(&json!({"pass1": "a", "pass2": "a"}), ErrorSchema::new())
        else {
            panic!("expected deferred");
        };
        assert!(future.await.is_empty());
    }
}
