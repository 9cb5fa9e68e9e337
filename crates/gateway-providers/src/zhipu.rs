//! Zhipu BigModel (v4 API).

use crate::adaptor::ProviderAdaptor;
use gateway_core::{ProviderKind, RelayMode};

const ROUTES: &[(RelayMode, &str)] = &[
    (RelayMode::ChatCompletions, "/api/paas/v4/chat/completions"),
    (RelayMode::Embeddings, "/api/paas/v4/embeddings"),
    (RelayMode::ImagesGenerations, "/api/paas/v4/images/generations"),
];

/// Adaptor for Zhipu.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZhipuAdaptor;

impl ProviderAdaptor for ZhipuAdaptor {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Zhipu
    }

    fn name(&self) -> &'static str {
        "Zhipu"
    }

    fn routes(&self) -> &'static [(RelayMode, &'static str)] {
        ROUTES
    }

    fn default_base_url(&self) -> &'static str {
        "https://open.bigmodel.cn"
    }
}
