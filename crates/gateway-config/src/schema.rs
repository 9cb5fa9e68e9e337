//! Configuration schema.

use gateway_core::ProviderKind;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GatewayConfig {
    /// HTTP listener settings.
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerSettings,
    /// Account database settings.
    #[serde(default)]
    #[validate(nested)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Quota display settings.
    #[serde(default)]
    #[validate(nested)]
    pub billing: BillingConfig,
    /// Upstream channels, matched to accounts by group.
    #[serde(default)]
    #[validate(nested)]
    pub channels: Vec<ChannelConfig>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerSettings {
    /// Bind address.
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,
    /// Connect and per-read timeout of the upstream HTTP client.
    #[serde(with = "humantime_serde", default = "default_upstream_timeout")]
    pub upstream_timeout: Duration,
    /// Grace period for in-flight requests on shutdown.
    #[serde(with = "humantime_serde", default = "default_shutdown_timeout")]
    pub shutdown_timeout: Duration,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_timeout: default_upstream_timeout(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Account database settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL.
    #[serde(default = "default_database_url")]
    #[validate(length(min = 1))]
    pub url: String,
    /// Maximum pool size. In-memory databases always use one connection.
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1))]
    pub max_connections: u32,
    /// Time to wait for a pooled connection.
    #[serde(with = "humantime_serde", default = "default_acquire_timeout")]
    pub acquire_timeout: Duration,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_password_memory_kib")]
    pub password_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
    /// Argon2 lane count.
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
}

fn default_database_url() -> String {
    "sqlite://relay-gateway.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_password_memory_kib() -> u32 {
    19_456
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout: default_acquire_timeout(),
            password_memory_kib: default_password_memory_kib(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
    /// Include file and line in text output.
    #[serde(default)]
    pub source_location: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            source_location: false,
        }
    }
}

/// Quota display settings for the dashboard billing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BillingConfig {
    /// Quota units per displayed currency unit.
    #[serde(default = "default_quota_per_unit")]
    #[validate(range(exclusive_min = 0.0))]
    pub quota_per_unit: f64,
}

fn default_quota_per_unit() -> f64 {
    500_000.0
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            quota_per_unit: default_quota_per_unit(),
        }
    }
}

/// One upstream channel.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChannelConfig {
    /// Unique channel name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Provider serving this channel.
    pub provider: ProviderKind,
    /// Base URL override; the provider default is used when absent.
    #[serde(default)]
    #[validate(url)]
    pub base_url: Option<String>,
    /// Upstream API key.
    #[serde(default = "empty_secret")]
    pub api_key: SecretString,
    /// Account group served by this channel.
    #[serde(default = "default_group")]
    pub group: String,
    /// Disabled channels are never selected.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_group() -> String {
    gateway_core::account::DEFAULT_GROUP.to_string()
}

fn default_true() -> bool {
    true
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}
