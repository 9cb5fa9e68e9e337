//! Alibaba DashScope native API.

use crate::adaptor::ProviderAdaptor;
use gateway_core::{ProviderKind, RelayMode};

const ROUTES: &[(RelayMode, &str)] = &[
    (
        RelayMode::ChatCompletions,
        "/api/v1/services/aigc/text-generation/generation",
    ),
    (
        RelayMode::Embeddings,
        "/api/v1/services/embeddings/text-embedding/text-embedding",
    ),
    (
        RelayMode::ImagesGenerations,
        "/api/v1/services/aigc/text2image/image-synthesis",
    ),
];

/// Adaptor for DashScope's native endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliAdaptor;

impl ProviderAdaptor for AliAdaptor {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ali
    }

    fn name(&self) -> &'static str {
        "Alibaba DashScope"
    }

    fn routes(&self) -> &'static [(RelayMode, &'static str)] {
        ROUTES
    }

    fn default_base_url(&self) -> &'static str {
        "https://dashscope.aliyuncs.com"
    }
}
