//! # Gateway Core
//!
//! Core types, error taxonomy and cancellation helpers for the relay gateway.
//!
//! This crate provides the foundational types shared by every other crate:
//! - The `GatewayError` taxonomy and `GatewayResult`
//! - Relay modes and provider identities
//! - Account domain types (records, visibility, ordering, paging)
//! - Cancellation-aware execution of I/O futures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod cancel;
pub mod error;
pub mod mode;
pub mod provider;

// Re-export commonly used types
pub use account::{Account, AccountId, AccountStatus, NewAccount, OrderKey, Page, Visibility};
pub use cancel::with_cancellation;
pub use error::{GatewayError, GatewayResult};
pub use mode::RelayMode;
pub use provider::ProviderKind;

/// Re-export of the cancellation token type used across the gateway.
pub use tokio_util::sync::CancellationToken;
