//! # Gateway Server
//!
//! HTTP surface of the relay gateway.
//!
//! This crate provides:
//! - Axum router with the OpenAI-compatible relay endpoints
//! - Billing dashboard endpoints
//! - The upstream HTTP client seam
//! - Graceful shutdown handling
//!
//! Authentication is not done here: the caller's middleware inserts an
//! [`AuthenticatedAccount`] into the request extensions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod upstream;

// Re-export main types
pub use error::ApiError;
pub use extractors::AuthenticatedAccount;
pub use routes::create_router;
pub use server::{shutdown_signal, Server, ServerError};
pub use state::{AppState, AppStateBuilder};
pub use upstream::{ReqwestUpstream, UpstreamBody, UpstreamClient, UpstreamRequest, UpstreamResponse};
