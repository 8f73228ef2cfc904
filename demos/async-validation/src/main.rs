//! # Async validation demo
//!
//! Drives a password-confirmation form whose "passwords match" rule is an
//! asynchronous validator, end to end:
//!
//! - **Settings**: loaded from a TOML or JSON file, then `SCHEMAFORM_*`
//!   environment overrides
//! - **Logging**: installed from the settings
//! - **Form**: edited, submitted while the validator is still running, then
//!   settled and rendered
//!
//! ## Running
//!
//! ```bash
//! cargo run --package async-validation-demo -- --pass1 secret --pass2 secrte
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use serde_json::{json, Value};
use tracing::Instrument;

use schemaform_core::logging::setup_logging;
use schemaform_core::{settings_loader, Settings};
use schemaform_forms::{FormHooks, FormProps, SchemaForm, SubmitEvent};
use schemaform_validate::{AsyncCustomValidator, AsyncValidator, ErrorSchema, JsonSchemaAdapter};

#[derive(Debug, Parser)]
#[command(name = "async-validation-demo", about = "Submit a password form with a slow validator")]
struct Args {
    /// Settings file (`.toml` or `.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "hunter2")]
    pass1: String,

    #[arg(long, default_value = "hunter3")]
    pass2: String,

    /// How long the "passwords match" check takes.
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Validate on every change instead of only on submit.
    #[arg(long)]
    live: bool,
}

struct PasswordsMatch {
    delay: Duration,
}

#[async_trait]
impl AsyncCustomValidator for PasswordsMatch {
    async fn validate(&self, data: Value, mut errors: ErrorSchema) -> ErrorSchema {
        tokio::time::sleep(self.delay).await;
        if data["pass1"] != data["pass2"] {
            errors.child("pass2").add_error("Passwords don't match.");
        }
        errors
    }
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(settings_loader::from_env());
    };
    settings_loader::from_file_with_env(path)
        .with_context(|| format!("loading settings from {}", path.display()))
}

fn password_schema() -> Value {
    json!({
        "title": "A registration form",
        "type": "object",
        "required": ["pass1", "pass2"],
        "properties": {
            "pass1": {"type": "string", "minLength": 3, "title": "Password"},
            "pass2": {"type": "string", "minLength": 3, "title": "Repeat password"}
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_ref())?;
    if args.live {
        settings.flags.live_validate = true;
    }
    setup_logging(&settings);

    run(args, &settings)
        .instrument(tracing::info_span!("demo", scenario = "registration"))
        .await
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    let adapter = JsonSchemaAdapter::new().with_custom_validator(AsyncValidator::new(
        PasswordsMatch {
            delay: Duration::from_millis(args.delay_ms),
        },
    ));
    let hooks = FormHooks::new()
        .on_change(|state| tracing::info!(data = %state.data, errors = state.errors().len(), "changed"))
        .on_submit(|submitted| tracing::info!(data = %submitted.state.data, status = ?submitted.status, "submitted"))
        .on_error(|errors| {
            for error in errors {
                tracing::warn!(stack = %error.stack(), "rejected");
            }
        });

    let props = FormProps::from_settings(password_schema(), settings).with_data(json!({}));
    let mut form = SchemaForm::builder(props)
        .adapter(adapter)
        .hooks(hooks)
        .build()
        .context("building the registration form")?;

    form.on_focus("root_pass1", json!(""));
    form.on_change(json!({"pass1": args.pass1.clone()}), None);
    form.on_blur("root_pass1", json!(args.pass1.clone()));
    form.on_change(json!({"pass1": args.pass1, "pass2": args.pass2}), None);

    form.on_submit(&mut SubmitEvent::new());
    if let Some(view) = form.take_render() {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    form.settle().await;
    if let Some(view) = form.take_render() {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }
    Ok(())
}
