//! Event emitter over any async writer.

use crate::frame::{format_frame, normalize_line, DONE};
use gateway_core::{with_cancellation, CancellationToken, GatewayError, GatewayResult};
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// Lifecycle of an emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Events may be written.
    Open,
    /// The terminal marker was written; further emission fails.
    Done,
}

/// Writes events to one caller, in call order, flushing after each frame.
///
/// Every write observes the cancellation token. A cancelled emitter never
/// writes the terminal marker.
#[derive(Debug)]
pub struct EventEmitter<W> {
    writer: W,
    cancel: CancellationToken,
    state: StreamState,
    frames: u64,
}

impl<W> EventEmitter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Create an open emitter.
    pub fn new(writer: W, cancel: CancellationToken) -> Self {
        Self {
            writer,
            cancel,
            state: StreamState::Open,
            frames: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Token observed by every write.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Frames written so far, the terminal marker included.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Emit one line of text. A leading `data: ` and trailing `\r` are
    /// stripped first, so forwarding an upstream SSE line does not double the
    /// prefix.
    pub async fn emit_raw(&mut self, line: &str) -> GatewayResult<()> {
        self.ensure_open()?;
        self.write_frame(normalize_line(line)).await
    }

    /// Serialize `value` to JSON and emit it. Nothing is written if
    /// serialization fails.
    pub async fn emit_object<T>(&mut self, value: &T) -> GatewayResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_open()?;
        let payload = serde_json::to_string(value)?;
        self.emit_raw(&payload).await
    }

    /// Emit the terminal marker and close the stream.
    pub async fn emit_done(&mut self) -> GatewayResult<()> {
        self.ensure_open()?;
        if self.cancel.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }
        self.write_frame(DONE).await?;
        self.state = StreamState::Done;
        debug!(frames = self.frames, "Event stream completed");
        Ok(())
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn ensure_open(&self) -> GatewayResult<()> {
        match self.state {
            StreamState::Open => Ok(()),
            StreamState::Done => Err(GatewayError::StreamTerminated),
        }
    }

    async fn write_frame(&mut self, payload: &str) -> GatewayResult<()> {
        let frame = format_frame(payload);
        let Self { writer, cancel, .. } = self;
        with_cancellation(cancel, async move {
            writer.write_all(frame.as_bytes()).await?;
            writer.flush().await?;
            Ok(())
        })
        .await?;
        self.frames += 1;
        trace!(bytes = payload.len(), "Frame written");
        Ok(())
    }
}
