//! Logging setup
//!
//! Log lines go to stderr so they never interleave with answers printed on
//! stdout. `RUST_LOG` takes precedence over the configured level, and an
//! optional file receives a copy of every line.

use crate::config::LoggingConfig;
use crate::error::Result;

use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter for a configuration
///
/// # Errors
///
/// Returns error if neither `RUST_LOG` nor the configured level is a valid
/// filter directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    Ok(filter)
}

/// Level filter used before the configuration is loaded
///
/// `RUST_LOG` wins, then `SONIA_LOG_LEVEL`, then `debug` when `verbose` is
/// set, otherwise `warn`.
pub fn bootstrap_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose {
        "debug".to_string()
    } else {
        std::env::var("SONIA_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string())
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Subscriber that reports problems found while loading the configuration
///
/// Install it with [`tracing::subscriber::with_default`] around
/// `Config::load`; [`init_logging`] takes over once the configuration is
/// known.
///
/// # Examples
///
/// ```no_run
/// use sonia::logging::bootstrap_subscriber;
///
/// tracing::subscriber::with_default(bootstrap_subscriber(false), || {
///     tracing::warn!("visible on stderr");
/// });
/// ```
pub fn bootstrap_subscriber(verbose: bool) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(bootstrap_filter(verbose))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish()
}

/// Initialize the global tracing subscriber
///
/// # Arguments
///
/// * `config` - Logging configuration
///
/// # Errors
///
/// Returns error if the filter is invalid, the log file cannot be opened,
/// or a global subscriber is already installed.
///
/// # Examples
///
/// ```no_run
/// use sonia::config::LoggingConfig;
/// use sonia::logging::init_logging;
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     json: false,
///     file_path: None,
/// };
/// init_logging(&config).unwrap();
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(config)?);

    if config.json {
        let stderr_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    } else {
        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_writer(std::io::stderr);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_writer(Arc::new(file));

            registry.with(stderr_layer).with(file_layer).try_init()?;
        } else {
            registry.with(stderr_layer).try_init()?;
        }
    }

    tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    Ok(())
}
