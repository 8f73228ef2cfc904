//! Logging integration for schemaform-rs.
//!
//! [`setup_logging`] installs a [`tracing`] subscriber configured from
//! [`Settings`](crate::settings::Settings). [`form_span`] opens the span the
//! orchestrator enters around every handler; it carries the form id and the
//! generation the handler ran under, so a discarded validation result can be
//! matched to the request that started it.

use tracing::field;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Installs the global tracing subscriber.
///
/// The filter comes from `settings.log_level`, falling back to `info` when
/// it does not parse. Debug mode prints human-readable lines and reports
/// when each form span closes, with its busy time; otherwise output is one
/// JSON object per event.
///
/// Returns `false` if a subscriber was already installed, in which case the
/// existing one is kept.
pub fn setup_logging(settings: &Settings) -> bool {
    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = Subscriber::builder().with_env_filter(filter).with_target(true);

    if settings.debug {
        builder
            .with_span_events(FmtSpan::CLOSE)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .is_ok()
    } else {
        builder.json().with_current_span(true).try_init().is_ok()
    }
}

/// Creates the span for one form.
///
/// The `generation` field starts empty; the orchestrator records it each
/// time it issues a new generation inside the span.
///
/// # Examples
///
/// ```
/// use schemaform_core::logging::form_span;
///
/// let span = form_span("signup");
/// let _guard = span.enter();
/// span.record("generation", 3_u64);
/// tracing::info!("deriving state");
/// ```
pub fn form_span(form_id: &str) -> tracing::Span {
    tracing::info_span!("form", id = form_id, generation = field::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_keeps_first() {
        let settings = Settings {
            log_level: "not a valid directive[".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        assert!(!setup_logging(&settings));
    }

    #[test]
    fn test_form_span_declares_generation() {
        let span = form_span("contact");
        if let Some(meta) = span.metadata() {
            assert!(meta.fields().field("generation").is_some());
            assert!(meta.fields().field("id").is_some());
        }
        span.record("generation", 1_u64);
    }
}
