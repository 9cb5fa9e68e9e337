//! Alibaba Bailian, served through DashScope's OpenAI-compatible mode.

use crate::adaptor::ProviderAdaptor;
use gateway_core::{ProviderKind, RelayMode};

const ROUTES: &[(RelayMode, &str)] = &[
    (RelayMode::ChatCompletions, "/compatible-mode/v1/chat/completions"),
    (RelayMode::Embeddings, "/compatible-mode/v1/embeddings"),
];

/// Adaptor for Bailian. Only chat completions and embeddings are routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AliBailianAdaptor;

impl ProviderAdaptor for AliBailianAdaptor {
    fn kind(&self) -> ProviderKind {
        ProviderKind::AliBailian
    }

    fn name(&self) -> &'static str {
        "Alibaba Bailian"
    }

    fn routes(&self) -> &'static [(RelayMode, &'static str)] {
        ROUTES
    }

    fn default_base_url(&self) -> &'static str {
        "https://dashscope.aliyuncs.com"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::GatewayError;

    #[test]
    fn test_chat_completions_url() {
        let url = AliBailianAdaptor
            .resolve_endpoint("https://dashscope.aliyuncs.com", RelayMode::ChatCompletions)
            .unwrap();
        assert_eq!(
            url,
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }

    #[test]
    fn test_embeddings_url() {
        let url = AliBailianAdaptor
            .resolve_endpoint("https://example.com/", RelayMode::Embeddings)
            .unwrap();
        assert_eq!(url, "https://example.com/compatible-mode/v1/embeddings");
    }

    #[test]
    fn test_other_modes_rejected() {
        for mode in RelayMode::ALL {
            if matches!(mode, RelayMode::ChatCompletions | RelayMode::Embeddings) {
                continue;
            }
            let err = AliBailianAdaptor
                .resolve_endpoint("https://dashscope.aliyuncs.com", mode)
                .unwrap_err();
            assert!(matches!(err, GatewayError::UnsupportedMode { .. }));
            assert_eq!(
                err.to_string(),
                format!("unsupported relay mode {mode} for ali-bailian")
            );
        }
    }
}
