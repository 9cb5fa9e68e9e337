//! # Gateway Providers
//!
//! Relay dispatch for the gateway.
//!
//! Every upstream provider is an adaptor behind [`ProviderAdaptor`]: a fixed
//! table from relay mode to URL suffix plus a default base address. The
//! [`ProviderRegistry`] is built once at startup and is read-only afterwards,
//! so adding a provider never touches call sites.
//!
//! Built-in adaptors:
//! - OpenAI and OpenAI-compatible services
//! - Alibaba DashScope (native API)
//! - Alibaba Bailian (OpenAI-compatible mode)
//! - Zhipu BigModel

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adaptor;
pub mod ali;
pub mod ali_bailian;
pub mod channel;
pub mod openai;
pub mod registry;
pub mod zhipu;

// Re-export main types
pub use adaptor::ProviderAdaptor;
pub use ali::AliAdaptor;
pub use ali_bailian::AliBailianAdaptor;
pub use channel::{Channel, ChannelTable};
pub use openai::OpenAiAdaptor;
pub use registry::ProviderRegistry;
pub use zhipu::ZhipuAdaptor;
