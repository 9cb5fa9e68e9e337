//! Forwarding an upstream SSE body through an [`EventEmitter`].

use crate::emitter::EventEmitter;
use crate::frame::{normalize_line, DONE};
use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use gateway_core::{with_cancellation, GatewayError, GatewayResult};
use std::fmt;
use tokio::io::AsyncWrite;
use tracing::{debug, warn};

/// Longest upstream line buffered while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Outcome of a forwarded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForwardSummary {
    /// Data frames forwarded, excluding our own terminal marker.
    pub frames: u64,
    /// Whether upstream sent its own `[DONE]`.
    pub upstream_done: bool,
}

/// Forward every `data:` line of an upstream SSE body, then emit `[DONE]`.
///
/// Lines may be split across chunks; partial lines are buffered. Upstream's
/// own `[DONE]` ends forwarding and is replaced by ours. Non-data lines
/// (`event:`, `id:`, comments, blank separators) are dropped. An upstream
/// error, a line longer than [`MAX_LINE_BYTES`] or cancellation of the
/// emitter's token aborts the stream without the terminal marker.
pub async fn forward_event_stream<W, S, E>(
    emitter: &mut EventEmitter<W>,
    upstream: S,
) -> GatewayResult<ForwardSummary>
where
    W: AsyncWrite + Unpin + Send,
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    pin_mut!(upstream);
    let cancel = emitter.cancellation().clone();
    let mut summary = ForwardSummary::default();
    let mut buffer: Vec<u8> = Vec::new();

    'read: loop {
        let next = with_cancellation(&cancel, async { Ok(upstream.next().await) }).await;
        let Some(chunk) = next? else {
            break;
        };
        let chunk = chunk.map_err(|e| {
            warn!(error = %e, "Upstream stream failed");
            GatewayError::upstream(None, e.to_string())
        })?;
        buffer.extend_from_slice(&chunk);

        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..pos]);
            if forward_line(emitter, &line, &mut summary).await? {
                break 'read;
            }
        }

        if buffer.len() > MAX_LINE_BYTES {
            warn!(buffered = buffer.len(), "Upstream line too long");
            return Err(GatewayError::upstream(
                None,
                format!("event line exceeds {MAX_LINE_BYTES} bytes"),
            ));
        }
    }

    if !summary.upstream_done && !buffer.is_empty() {
        let line = String::from_utf8_lossy(&buffer).into_owned();
        forward_line(emitter, &line, &mut summary).await?;
    }

    emitter.emit_done().await?;
    debug!(
        frames = summary.frames,
        upstream_done = summary.upstream_done,
        "Upstream stream forwarded"
    );
    Ok(summary)
}

/// Forward one line. Returns `true` once upstream signalled completion.
async fn forward_line<W>(
    emitter: &mut EventEmitter<W>,
    line: &str,
    summary: &mut ForwardSummary,
) -> GatewayResult<bool>
where
    W: AsyncWrite + Unpin + Send,
{
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(false);
    };
    let payload = normalize_line(data.strip_prefix(' ').unwrap_or(data));
    if payload == DONE {
        summary.upstream_done = true;
        return Ok(true);
    }
    emitter.emit_raw(payload).await?;
    summary.frames += 1;
    Ok(false)
}
