//! Upstream HTTP client seam.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use gateway_core::{GatewayError, GatewayResult};
use http::header;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request forwarded to a provider.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Fully resolved endpoint URL.
    pub url: String,
    /// Channel key, sent as a bearer token.
    pub api_key: SecretString,
    /// Caller's body, forwarded unchanged.
    pub body: Bytes,
    /// Caller's content type, if any.
    pub content_type: Option<String>,
}

/// Body of a successful upstream response.
pub enum UpstreamBody {
    /// Complete body, passed through as-is.
    Full(Bytes),
    /// Server-sent event stream, forwarded frame by frame.
    EventStream(BoxStream<'static, GatewayResult<Bytes>>),
}

impl fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Self::EventStream(_) => f.write_str("EventStream"),
        }
    }
}

/// Successful upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    /// Upstream HTTP status.
    pub status: u16,
    /// Upstream content type.
    pub content_type: Option<String>,
    /// Response body.
    pub body: UpstreamBody,
}

/// Sends relay requests to providers.
///
/// Failures of any kind surface as [`GatewayError::Upstream`] so callers can
/// tell them apart from dispatch errors. No retries happen here.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send one request.
    async fn send(&self, request: UpstreamRequest) -> GatewayResult<UpstreamResponse>;
}

/// [`UpstreamClient`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestUpstream {
    client: reqwest::Client,
}

impl ReqwestUpstream {
    /// Create a client whose connect and per-read waits are bounded by `timeout`.
    ///
    /// The read timeout restarts on every chunk, so long streams stay open
    /// while an upstream that stops answering is cut off.
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| GatewayError::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn is_event_stream(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.starts_with(mime::TEXT_EVENT_STREAM.as_ref()))
}

#[async_trait]
impl UpstreamClient for ReqwestUpstream {
    #[instrument(skip(self, request), fields(url = %request.url), err)]
    async fn send(&self, request: UpstreamRequest) -> GatewayResult<UpstreamResponse> {
        let mut builder = self
            .client
            .post(&request.url)
            .bearer_auth(request.api_key.expose_secret())
            .body(request.body);
        if let Some(content_type) = &request.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::upstream(None, format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "Failed to read upstream error body");
                    String::new()
                }
            };
            warn!(status = status.as_u16(), "Upstream returned an error");
            return Err(GatewayError::upstream(Some(status.as_u16()), body));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        debug!(status = status.as_u16(), content_type = ?content_type, "Upstream responded");

        let body = if is_event_stream(content_type.as_deref()) {
            UpstreamBody::EventStream(
                response
                    .bytes_stream()
                    .map(|chunk| {
                        chunk.map_err(|e| GatewayError::upstream(None, format!("Stream error: {e}")))
                    })
                    .boxed(),
            )
        } else {
            UpstreamBody::Full(
                response
                    .bytes()
                    .await
                    .map_err(|e| GatewayError::upstream(None, format!("Failed to read body: {e}")))?,
            )
        };

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_stream_detection() {
        assert!(is_event_stream(Some("text/event-stream")));
        assert!(is_event_stream(Some("text/event-stream; charset=utf-8")));
        assert!(!is_event_stream(Some("application/json")));
        assert!(!is_event_stream(None));
    }

    fn request(url: String) -> UpstreamRequest {
        UpstreamRequest {
            url,
            api_key: SecretString::new("sk-secret".to_string()),
            body: Bytes::from_static(b"{}"),
            content_type: None,
        }
    }

    #[test]
    fn test_request_debug_hides_key() {
        let request = request("https://api.example.com/v1/chat/completions".to_string());
        assert!(!format!("{request:?}").contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering.
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let upstream = ReqwestUpstream::new(Duration::from_millis(200)).unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(3),
            upstream.send(request(format!("http://{addr}/v1/chat/completions"))),
        )
        .await
        .expect("send should give up once the read timeout elapses");

        assert!(matches!(result, Err(GatewayError::Upstream { status: None, .. })));
    }
}
