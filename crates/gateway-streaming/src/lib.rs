//! # Gateway Streaming
//!
//! Provider-agnostic event stream sent back to relay callers.
//!
//! Every event is one `data: <payload>\n\n` frame; the stream ends with a
//! single `data: [DONE]\n\n` frame and nothing may follow it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod emitter;
pub mod forward;
pub mod frame;

pub use emitter::{EventEmitter, StreamState};
pub use forward::{forward_event_stream, ForwardSummary};
pub use frame::{format_frame, normalize_line, DATA_PREFIX, DONE};
