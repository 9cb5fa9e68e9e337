//! Tracing subscriber setup.
//!
//! Installs a single `fmt` layer behind an `EnvFilter`. `RUST_LOG` wins over
//! the configured level so operators can raise verbosity without touching the
//! config file.

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Service name reported in the startup event
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Default filter directive
    pub log_level: String,
    /// Emit JSON lines
    pub json: bool,
    /// Include file and line in text output
    pub with_source_location: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: "relay-gateway".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            json: false,
            with_source_location: false,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing configuration
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the log level
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Switch JSON output on or off
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Include file and line numbers
    #[must_use]
    pub fn with_source_location(mut self, enabled: bool) -> Self {
        self.with_source_location = enabled;
        self
    }

    /// Build the filter: `RUST_LOG` first, then the configured level.
    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_level)
                .map_err(|e| TracingError::Filter(format!("{}: {e}", self.log_level))),
        }
    }
}

/// Initialize the global subscriber
///
/// # Errors
/// Returns error if the filter is invalid or a subscriber is already installed
pub fn init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let fmt_layer = if config.json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(config.with_source_location)
            .with_line_number(config.with_source_location)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .try_init()
        .map_err(|e| TracingError::Init(e.to_string()))?;

    info!(
        service = %config.service_name,
        version = %config.service_version,
        json = config.json,
        "Tracing initialized"
    );

    Ok(())
}

/// Tracing initialization error
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// Failed to install the subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
    /// The filter directive did not parse
    #[error("Invalid log filter: {0}")]
    Filter(String),
}

/// Create a span for one relayed request
#[macro_export]
macro_rules! relay_span {
    ($account_id:expr, $mode:expr, $provider:expr) => {
        tracing::info_span!(
            "relay_request",
            account_id = %$account_id,
            mode = %$mode,
            provider = %$provider,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::new("test-service")
            .with_log_level("debug")
            .with_json(true)
            .with_source_location(true);

        assert_eq!(config.service_name, "test-service");
        assert_eq!(config.log_level, "debug");
        assert!(config.json);
        assert!(config.with_source_location);
    }

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.service_name, "relay-gateway");
        assert_eq!(config.log_level, "info");
        assert!(!config.json);
    }

    #[test]
    fn test_filter_accepts_directives() {
        let config = TracingConfig::default().with_log_level("gateway_server=debug,info");
        assert!(config.filter().is_ok());
    }
}
