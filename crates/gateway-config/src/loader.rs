//! Configuration loading, environment overrides and validation.

use crate::schema::GatewayConfig;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "GATEWAY_";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not a known format.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// The file could not be parsed.
    #[error("Failed to parse {format} config: {message}")]
    Parse {
        /// Format being parsed.
        format: ConfigFormat,
        /// Parser message.
        message: String,
    },

    /// An environment override has an invalid value.
    #[error("Invalid value for {key}: {value}")]
    InvalidEnv {
        /// Environment variable name.
        key: String,
        /// Offending value.
        value: String,
    },

    /// The merged configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yaml`, `.yml`).
    Yaml,
    /// TOML (`.toml`).
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Toml => write!(f, "TOML"),
        }
    }
}

impl GatewayConfig {
    /// Parse configuration text in the given format.
    pub fn parse(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
                format,
                message: e.to_string(),
            }),
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse {
                format,
                message: e.to_string(),
            }),
        }
    }

    /// Apply `GATEWAY_*` overrides read through `lookup`.
    ///
    /// Taking the lookup as a function keeps tests independent of the process
    /// environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((_, host)) = var("HOST") {
            self.server.host = host;
        }
        if let Some((key, port)) = var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key, value: port })?;
        }
        if let Some((_, url)) = var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some((_, level)) = var("LOG_LEVEL") {
            self.telemetry.log_level = level;
        }
        if let Some((key, json)) = var("LOG_JSON") {
            self.telemetry.json = match json.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => return Err(ConfigError::InvalidEnv { key, value: json }),
            };
        }
        Ok(())
    }

    /// Validate the merged configuration.
    ///
    /// Field rules are declared on the schema; channel names must also be unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Validate::validate(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let mut names = HashSet::new();
        for channel in &self.channels {
            if !names.insert(channel.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate channel name: {}",
                    channel.name
                )));
            }
        }
        Ok(())
    }
}

/// Load configuration: defaults, then the optional file, then environment overrides.
pub async fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let format = ConfigFormat::from_path(path)?;
            let contents = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            info!(path = %path.display(), %format, "Loading configuration file");
            GatewayConfig::parse(&contents, format)?
        }
        None => {
            debug!("No configuration file given, using defaults");
            GatewayConfig::default()
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;

    debug!(
        channels = config.channels.len(),
        database = %config.database.url,
        "Configuration resolved"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ProviderKind;
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    const YAML: &str = r#"
server:
  port: 8080
  upstream_timeout: 45s
database:
  url: "sqlite::memory:"
channels:
  - name: bailian
    provider: ali-bailian
    base_url: https://dashscope.aliyuncs.com
    api_key: sk-test
    group: vip
"#;

    #[test]
    fn test_parse_yaml() {
        let config = GatewayConfig::parse(YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.upstream_timeout, Duration::from_secs(45));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.channels.len(), 1);
        assert_eq!(config.channels[0].provider, ProviderKind::AliBailian);
        assert_eq!(config.channels[0].group, "vip");
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[server]
host = "127.0.0.1"

[[channels]]
name = "main"
provider = "openai"
"#;
        let config = GatewayConfig::parse(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.channels[0].provider, ProviderKind::OpenAI);
        assert_eq!(config.channels[0].group, "default");
    }

    #[test]
    fn test_parse_error() {
        let err = GatewayConfig::parse("server: [", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { format: ConfigFormat::Yaml, .. }));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.yml")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")).unwrap(), ConfigFormat::Toml);
        assert!(ConfigFormat::from_path(Path::new("a.json")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GATEWAY_PORT", "9000"),
            ("GATEWAY_DATABASE_URL", "sqlite://other.db"),
            ("GATEWAY_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = GatewayConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "sqlite://other.db");
        assert!(config.telemetry.json);
    }

    #[test]
    fn test_invalid_env_port() {
        let mut config = GatewayConfig::default();
        let err = config
            .apply_overrides(|key| (key == "GATEWAY_PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_validate_rejects_duplicate_channels() {
        let yaml = r"
channels:
  - name: a
    provider: openai
  - name: a
    provider: zhipu
";
        let config = GatewayConfig::parse(yaml, ConfigFormat::Yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate channel name"));
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let yaml = r"
channels:
  - name: a
    provider: openai
    base_url: not a url
";
        let config = GatewayConfig::parse(yaml, ConfigFormat::Yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_validate_field_rules() {
        let mut config = GatewayConfig::default();
        config.validate().unwrap();

        config.server.port = 0;
        assert!(config.validate().unwrap_err().to_string().contains("port"));

        let mut config = GatewayConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_connections"));

        let mut config = GatewayConfig::default();
        config.billing.quota_per_unit = 0.0;
        assert!(config.validate().unwrap_err().to_string().contains("quota_per_unit"));
    }

    #[test]
    fn test_validate_rejects_empty_channel_name() {
        let yaml = r#"
channels:
  - name: ""
    provider: openai
"#;
        let config = GatewayConfig::parse(yaml, ConfigFormat::Yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let config = load_config(Some(file.path())).await.unwrap();
        assert_eq!(config.channels[0].name, "bailian");
    }

    #[tokio::test]
    async fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/relay.yaml")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
