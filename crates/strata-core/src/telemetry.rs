//! Tracing initialisation.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a pretty
//! or JSON formatting layer. `RUST_LOG` takes precedence over the configured
//! level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    /// Default filter directive when `RUST_LOG` is unset (e.g. `info,strata=debug`).
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target (module path) in output.
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

fn default_filter() -> String {
    "info,strata=debug".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
            with_target: default_with_target(),
        }
    }
}

impl TracingConfig {
    /// Builds the filter, preferring `RUST_LOG` over the configured directive.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter))
    }
}

/// Installs the global tracing subscriber.
///
/// Returns `false` if a global subscriber was already installed; that is not
/// treated as an error so tests and embedding applications can call this
/// freely.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(config.with_target))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
            .try_init(),
    };

    match result {
        Ok(()) => {
            tracing::debug!(filter = %config.filter, format = ?config.format, "Tracing initialized");
            true
        }
        Err(e) => {
            tracing::debug!("Tracing subscriber already installed: {}", e);
            false
        }
    }
}
