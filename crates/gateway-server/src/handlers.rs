//! HTTP request handlers.

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::stream::BoxStream;
use gateway_core::{Account, CancellationToken, GatewayError, GatewayResult, RelayMode};
use gateway_streaming::{forward_event_stream, EventEmitter};
use gateway_telemetry::relay_span;
use serde::Serialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument, warn, Instrument, Span};

use crate::{
    error::ApiError,
    extractors::AuthenticatedAccount,
    state::AppState,
    upstream::{UpstreamBody, UpstreamRequest},
};

/// Capacity of the pipe between the emitter task and the response body.
const STREAM_BUFFER: usize = 16 * 1024;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Version
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Subscription summary in OpenAI's dashboard format.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    /// Always `billing_subscription`.
    pub object: &'static str,
    /// Always true.
    pub has_payment_method: bool,
    /// Same as `hard_limit_usd`.
    pub soft_limit_usd: f64,
    /// Total allowance (remaining + consumed) in currency units.
    pub hard_limit_usd: f64,
    /// Same as `hard_limit_usd`.
    pub system_hard_limit_usd: f64,
    /// Expiry timestamp; accounts never expire.
    pub access_until: i64,
}

/// Usage summary in OpenAI's dashboard format.
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    /// Always `list`.
    pub object: &'static str,
    /// Consumed quota in hundredths of a currency unit.
    pub total_usage: f64,
}

/// Relay a request to the channel serving the caller's group.
///
/// Checks run before any network I/O: the account must be active and have
/// quota left, a channel must serve its group, and the channel's provider
/// must support the mode.
#[instrument(skip_all, fields(account_id = account_id, path = %uri.path()))]
pub async fn relay(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let mode = RelayMode::from_path(uri.path());
    if mode == RelayMode::Unknown {
        return Err(ApiError::bad_request(format!("unknown relay path {}", uri.path())));
    }

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let account = state.accounts.get_by_id(account_id, false, &cancel).await?;
    ensure_can_relay(&account)?;

    let channel = state.channels.for_group(&account.group).ok_or_else(|| {
        ApiError::service_unavailable(format!(
            "no available channel for group {}",
            account.group
        ))
    })?;
    let url = state.channels.resolve(&state.providers, channel, mode)?;

    info!(
        %mode,
        provider = %channel.provider,
        channel = %channel.name,
        "Relaying request"
    );

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let response = state
        .upstream
        .send(UpstreamRequest {
            url,
            api_key: channel.api_key.clone(),
            body,
            content_type,
        })
        .await?;

    match response.body {
        UpstreamBody::Full(bytes) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
            let content_type = response
                .content_type
                .unwrap_or_else(|| mime::APPLICATION_JSON.to_string());
            Ok((status, [(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        UpstreamBody::EventStream(stream) => stream_response(
            stream,
            state.shutdown.child_token(),
            relay_span!(account_id, mode, channel.provider),
        ),
    }
}

fn ensure_can_relay(account: &Account) -> GatewayResult<()> {
    if !account.is_active() {
        return Err(GatewayError::forbidden(format!(
            "account is {}",
            account.status
        )));
    }
    if account.quota <= 0 {
        return Err(GatewayError::forbidden("quota exhausted"));
    }
    Ok(())
}

/// Run the emitter on its own task, inside `span`, and return the read side
/// as the body.
fn stream_response(
    upstream: BoxStream<'static, GatewayResult<Bytes>>,
    cancel: CancellationToken,
    span: Span,
) -> Result<Response, ApiError> {
    let (writer, reader) = tokio::io::duplex(STREAM_BUFFER);

    let task = async move {
        let mut emitter = EventEmitter::new(writer, cancel);
        match forward_event_stream(&mut emitter, upstream).await {
            Ok(summary) => debug!(
                frames = summary.frames,
                upstream_done = summary.upstream_done,
                "Relay stream finished"
            ),
            Err(e) => warn!(error = %e, "Relay stream aborted"),
        }
    };
    tokio::spawn(task.instrument(span));

    Response::builder()
        .header(header::CONTENT_TYPE, mime::TEXT_EVENT_STREAM.as_ref())
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Subscription endpoint (`/dashboard/billing/subscription`)
#[instrument(skip(state))]
pub async fn billing_subscription(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let account = state.accounts.get_by_id(account_id, false, &cancel).await?;

    let amount = (account.quota + account.used_quota) as f64 / state.billing.quota_per_unit;
    Ok(Json(SubscriptionResponse {
        object: "billing_subscription",
        has_payment_method: true,
        soft_limit_usd: amount,
        hard_limit_usd: amount,
        system_hard_limit_usd: amount,
        access_until: 0,
    }))
}

/// Usage endpoint (`/dashboard/billing/usage`)
#[instrument(skip(state))]
pub async fn billing_usage(
    State(state): State<AppState>,
    AuthenticatedAccount(account_id): AuthenticatedAccount,
) -> Result<Json<UsageResponse>, ApiError> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let account = state.accounts.get_by_id(account_id, false, &cancel).await?;

    let amount = account.used_quota as f64 / state.billing.quota_per_unit;
    Ok(Json(UsageResponse {
        object: "list",
        total_usage: amount * 100.0,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::AccountStatus;

    fn account(status: AccountStatus, quota: i64) -> Account {
        Account {
            id: 1,
            username: "alice".to_string(),
            password: String::new(),
            display_name: "alice".to_string(),
            role: 1,
            status,
            email: String::new(),
            access_token: String::new(),
            quota,
            used_quota: 0,
            request_count: 0,
            group: "default".to_string(),
            aff_code: String::new(),
            inviter_id: 0,
        }
    }

    #[test]
    fn test_ensure_can_relay() {
        assert!(ensure_can_relay(&account(AccountStatus::Active, 1)).is_ok());

        let err = ensure_can_relay(&account(AccountStatus::Disabled, 1)).unwrap_err();
        assert_eq!(err.to_string(), "Forbidden: account is disabled");

        let err = ensure_can_relay(&account(AccountStatus::Active, 0)).unwrap_err();
        assert!(matches!(err, GatewayError::Forbidden { .. }));
    }
}
