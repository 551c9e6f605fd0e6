//! Tracing subscriber setup.
//!
//! Log verbosity comes from `-v` flags (or `VENDI_LOG_LEVEL`); when neither
//! is set, `RUST_LOG` still applies through the default `EnvFilter`. Set
//! `VENDI_LOG_JSON=1` for JSON output.

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Initialize the global tracing subscriber.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init(level: Option<Level>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME"))),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
    };

    let json_output = env::var("VENDI_LOG_JSON").is_ok_and(|value| value == "1");

    if json_output {
        let subscriber = Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true));
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set global tracing subscriber")
    } else {
        let subscriber = Registry::default().with(filter).with(fmt::layer());
        tracing::subscriber::set_global_default(subscriber)
            .context("Failed to set global tracing subscriber")
    }
}
