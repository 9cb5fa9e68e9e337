//! Error types shared across the gateway.

use crate::mode::RelayMode;
use crate::provider::ProviderKind;
use http::StatusCode;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Unified gateway error.
///
/// Store and dispatch errors are deterministic and must reach the caller
/// unmodified; nothing in this crate retries them.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No record matched the lookup.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of record looked up (e.g. "account").
        entity: &'static str,
        /// The key that failed to match.
        key: String,
    },

    /// Uniqueness constraint violated on create.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting value.
        message: String,
    },

    /// Password hashing failed.
    #[error("Credential error: {message}")]
    Credential {
        /// Hasher failure description. Never contains the plaintext.
        message: String,
    },

    /// The provider has no route for the requested mode.
    #[error("unsupported relay mode {mode} for {provider}")]
    UnsupportedMode {
        /// The offending mode.
        mode: RelayMode,
        /// The provider that rejected it.
        provider: ProviderKind,
    },

    /// The provider is not registered with the dispatcher.
    #[error("provider {provider} is not registered")]
    UnsupportedProvider {
        /// The unknown provider.
        provider: ProviderKind,
    },

    /// A value could not be encoded for streaming.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Encoder failure description.
        message: String,
    },

    /// The operation was aborted by its cancellation signal.
    #[error("operation cancelled")]
    Cancelled,

    /// Opaque failure reported by the upstream HTTP collaborator.
    #[error("Upstream error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Upstream {
        /// Upstream HTTP status, if a response was received.
        status: Option<u16>,
        /// Upstream failure description.
        message: String,
    },

    /// An event was emitted after the terminal marker.
    #[error("stream already terminated")]
    StreamTerminated,

    /// Backing store failure not covered by a more specific variant.
    #[error("Storage error: {message}")]
    Storage {
        /// Store failure description.
        message: String,
    },

    /// Writing or flushing the caller connection failed.
    #[error("Transport error: {message}")]
    Transport {
        /// Transport failure description.
        message: String,
    },

    /// The account may not use the relay (disabled, out of quota).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Reason shown to the caller.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the invalid setting.
        message: String,
    },
}

impl GatewayError {
    /// Create a not-found error for an account key.
    pub fn account_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity: "account",
            key: key.to_string(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a credential error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an upstream error.
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::UnsupportedMode { .. } | Self::UnsupportedProvider { .. } => {
                StatusCode::BAD_REQUEST
            }
            // 499: client closed request
            Self::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Credential { .. }
            | Self::Serialization { .. }
            | Self::StreamTerminated
            | Self::Storage { .. }
            | Self::Transport { .. }
            | Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable error type.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found_error",
            Self::Conflict { .. } => "conflict_error",
            Self::Credential { .. } => "credential_error",
            Self::UnsupportedMode { .. } => "unsupported_mode_error",
            Self::UnsupportedProvider { .. } => "unsupported_provider_error",
            Self::Serialization { .. } => "serialization_error",
            Self::Cancelled => "cancelled_error",
            Self::Upstream { .. } => "upstream_error",
            Self::StreamTerminated => "stream_terminated_error",
            Self::Storage { .. } => "storage_error",
            Self::Transport { .. } => "transport_error",
            Self::Forbidden { .. } => "forbidden_error",
            Self::Configuration { .. } => "configuration_error",
        }
    }

    /// Whether a higher layer may retry the operation.
    ///
    /// Only upstream 5xx/transport failures qualify; dispatch and store errors
    /// are deterministic.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Upstream { status, .. } => status.map_or(true, |s| s >= 500),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }
}
