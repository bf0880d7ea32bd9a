//! Structured logging for the generator.
//!
//! Log output always goes to stderr so that `--dry-run` can print generated code
//! on stdout untouched. Configured from the environment:
//!
//! - `VALIDATION_GEN_LOG`: an `EnvFilter` directive such as `debug` or
//!   `validation_gen::generator=trace` (default `warn`)
//! - `VALIDATION_GEN_LOG_FORMAT`: `compact`, `pretty` or `json` (default `compact`)

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_ENV: &str = "VALIDATION_GEN_LOG";
pub const LOG_FORMAT_ENV: &str = "VALIDATION_GEN_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive string
    pub filter: String,
    pub format: LogFormat,
    /// `filter` came from `VALIDATION_GEN_LOG` and wins over `--verbose`
    pub filter_from_env: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            format: LogFormat::Compact,
            filter_from_env: false,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        let env_filter = env::var(LOG_ENV).ok().filter(|s| !s.trim().is_empty());
        Self {
            filter_from_env: env_filter.is_some(),
            filter: env_filter.unwrap_or_else(|| "warn".to_string()),
            format: LogFormat::parse(
                &env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "compact".to_string()),
            ),
        }
    }

    /// Raise the default level to `debug`, unless the environment set a filter.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        if verbose && !self.filter_from_env {
            self.filter = "debug".to_string();
        }
        self
    }
}

/// Install the global subscriber.
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("Invalid log filter '{}'", config.filter))?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
