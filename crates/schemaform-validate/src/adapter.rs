//! The validation seam.
//!
//! The form orchestrator never validates data itself; it asks a
//! [`ValidationAdapter`]. An adapter answers with a [`Validation`], which is
//! either a finished [`ErrorReport`] or a future that will produce one.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::report::ErrorReport;

/// A validation result that is still being computed.
pub type DeferredReport = Pin<Box<dyn Future<Output = ErrorReport> + Send + 'static>>;

/// The answer of a [`ValidationAdapter`].
pub enum Validation {
    /// The report is available now.
    Ready(ErrorReport),
    /// The report will be available once the future completes.
    Deferred(DeferredReport),
}

impl Validation {
    /// Wraps a future as a deferred validation.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = ErrorReport> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Returns `true` if the report is not available yet.
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Waits for the report, whichever shape it arrived in.
    pub async fn resolve(self) -> ErrorReport {
        match self {
            Self::Ready(report) => report,
            Self::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(report) => f.debug_tuple("Ready").field(report).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<ErrorReport> for Validation {
    fn from(report: ErrorReport) -> Self {
        Self::Ready(report)
    }
}

/// Validates form data against a schema.
///
/// Implementations must be pure with respect to their inputs: the same data
/// and schema always produce the same report. Closures with the matching
/// signature implement the trait directly.
pub trait ValidationAdapter: Send + Sync {
    /// Validates `data` against `schema`.
    fn validate(&self, data: &Value, schema: &Value) -> Validation;
}

impl<F> ValidationAdapter for F
where
    F: Fn(&Value, &Value) -> Validation + Send + Sync,
{
    fn validate(&self, data: &Value, schema: &Value) -> Validation {
        self(data, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ErrorSchema, FieldPath};
    use serde_json::json;
    use std::time::Duration;

    fn failing_report() -> ErrorReport {
        let mut schema = ErrorSchema::new();
        schema.at_path(&FieldPath::from_segments(["x"])).add_error("bad");
        ErrorReport::from_schema(schema)
    }

    #[tokio::test]
    async fn test_ready_resolves_immediately() {
        let validation = Validation::from(failing_report());
        assert!(!validation.is_deferred());
        assert_eq!(validation.resolve().await, failing_report());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_resolves_after_delay() {
        let validation = Validation::deferred(async {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            failing_report()
        });
        assert!(validation.is_deferred());
        assert_eq!(validation.resolve().await, failing_report());
    }

    #[test]
    fn test_closure_is_adapter() {
        let adapter = |data: &Value, _schema: &Value| {
            if data.is_null() {
                Validation::Ready(failing_report())
            } else {
                Validation::Ready(ErrorReport::empty())
            }
        };
        match adapter.validate(&json!(1), &json!({})) {
            Validation::Ready(report) => assert!(report.is_empty()),
            Validation::Deferred(_) => panic!("expected a ready report"),
        }
    }

    #[test]
    fn test_debug_hides_future() {
        let validation = Validation::deferred(async { ErrorReport::empty() });
        assert_eq!(format!("{validation:?}"), "Deferred(..)");
    }
}
