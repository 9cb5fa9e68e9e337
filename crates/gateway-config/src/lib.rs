//! # Gateway Config
//!
//! Configuration for the relay gateway.
//!
//! Configuration is layered:
//! 1. Built-in defaults
//! 2. A YAML or TOML file (format picked by extension)
//! 3. `GATEWAY_*` environment overrides
//!
//! The merged result is validated before it is handed to the server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError, ConfigFormat, ENV_PREFIX};
pub use schema::{
    BillingConfig, ChannelConfig, DatabaseConfig, GatewayConfig, ServerSettings, TelemetryConfig,
};
