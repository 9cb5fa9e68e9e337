//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_core::GatewayError;
use serde::Serialize;
use tracing::{error, warn};

/// Error returned by handlers, rendered as an OpenAI-style error body.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    error_type: &'static str,
    message: String,
    code: Option<&'static str>,
}

/// Wire shape: `{"error": {"message", "type", "code"}}`.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    error_type: &'a str,
    code: Option<&'a str>,
}

impl ApiError {
    /// Create an error with an explicit status and type.
    pub fn new(status: StatusCode, error_type: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type,
            message: message.into(),
            code: None,
        }
    }

    /// Attach a machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// 401: no authenticated account on the request.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication_error", message)
    }

    /// 400: malformed request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request_error", message)
    }

    /// 503: no channel can serve the request.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", message)
    }

    /// 500: unexpected failure.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Message shown to the caller.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = err.status_code();
        let code = match &err {
            GatewayError::Forbidden { .. } => Some("forbidden"),
            GatewayError::UnsupportedMode { .. } => Some("unsupported_mode"),
            GatewayError::Cancelled => Some("cancelled"),
            GatewayError::Upstream { status, .. } => Some(match status {
                Some(s) if *s < 500 => "upstream_client_error",
                Some(_) => "upstream_server_error",
                None => "upstream_unreachable",
            }),
            _ => None,
        };

        // Internal details stay in the log; the caller gets a generic message.
        let message = if status.is_server_error() && !matches!(err, GatewayError::Upstream { .. }) {
            error!(error = %err, "Request failed");
            "internal server error".to_string()
        } else {
            warn!(error = %err, status = status.as_u16(), "Request rejected");
            err.to_string()
        };

        Self {
            status,
            error_type: err.error_type(),
            message,
            code,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                message: &self.message,
                error_type: self.error_type,
                code: self.code,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::{ProviderKind, RelayMode};

    #[test]
    fn test_unsupported_mode_is_bad_request() {
        let err = ApiError::from(GatewayError::UnsupportedMode {
            mode: RelayMode::AudioSpeech,
            provider: ProviderKind::AliBailian,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("audio_speech"));
    }

    #[test]
    fn test_storage_details_hidden() {
        let err = ApiError::from(GatewayError::storage("disk I/O error at /var/db"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "internal server error");
    }

    #[test]
    fn test_upstream_message_passed_through() {
        let err = ApiError::from(GatewayError::upstream(Some(429), "rate limited"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.message().contains("rate limited"));
        assert!(err.message().contains("429"));
    }

    #[test]
    fn test_upstream_status_class_in_code() {
        let code = |status| ApiError::from(GatewayError::upstream(status, "x")).code;
        assert_eq!(code(Some(401)), Some("upstream_client_error"));
        assert_eq!(code(Some(503)), Some("upstream_server_error"));
        assert_eq!(code(None), Some("upstream_unreachable"));
    }

    #[test]
    fn test_forbidden() {
        let err = ApiError::from(GatewayError::forbidden("quota exhausted"));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code, Some("forbidden"));
    }
}
