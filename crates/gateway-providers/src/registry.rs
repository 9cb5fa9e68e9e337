//! Provider registry.

use crate::adaptor::ProviderAdaptor;
use crate::{AliAdaptor, AliBailianAdaptor, OpenAiAdaptor, ZhipuAdaptor};
use gateway_core::{GatewayError, GatewayResult, ProviderKind, RelayMode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Adaptors keyed by provider kind.
///
/// Populated once at startup through [`register`](Self::register) and shared
/// read-only behind an `Arc` afterwards.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adaptors: HashMap<ProviderKind, Arc<dyn ProviderAdaptor>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in adaptor.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new()
            .register(OpenAiAdaptor)
            .register(AliAdaptor)
            .register(AliBailianAdaptor)
            .register(ZhipuAdaptor)
    }

    /// Add an adaptor, replacing any previous one of the same kind.
    #[must_use]
    pub fn register<A>(mut self, adaptor: A) -> Self
    where
        A: ProviderAdaptor + 'static,
    {
        let kind = adaptor.kind();
        debug!(provider = %kind, name = adaptor.name(), "Registering provider adaptor");
        self.adaptors.insert(kind, Arc::new(adaptor));
        self
    }

    /// Adaptor for `kind`.
    pub fn get(&self, kind: ProviderKind) -> GatewayResult<&Arc<dyn ProviderAdaptor>> {
        self.adaptors
            .get(&kind)
            .ok_or(GatewayError::UnsupportedProvider { provider: kind })
    }

    /// Whether `kind` has an adaptor.
    #[must_use]
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.adaptors.contains_key(&kind)
    }

    /// Number of registered adaptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adaptors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adaptors.is_empty()
    }

    /// Upstream URL for `mode` on provider `kind` under `base_url`.
    pub fn resolve(
        &self,
        kind: ProviderKind,
        base_url: &str,
        mode: RelayMode,
    ) -> GatewayResult<String> {
        self.get(kind)?.resolve_endpoint(base_url, mode)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.adaptors.keys().map(ProviderKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("adaptors", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_kind() {
        let registry = ProviderRegistry::builtin();
        assert_eq!(registry.len(), 4);
        for kind in [
            ProviderKind::OpenAI,
            ProviderKind::Ali,
            ProviderKind::AliBailian,
            ProviderKind::Zhipu,
        ] {
            assert!(registry.contains(kind));
            assert_eq!(registry.get(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_resolve_bailian() {
        let registry = ProviderRegistry::builtin();
        let url = registry
            .resolve(
                ProviderKind::AliBailian,
                "https://dashscope.aliyuncs.com",
                RelayMode::ChatCompletions,
            )
            .unwrap();
        assert_eq!(
            url,
            "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let registry = ProviderRegistry::builtin();
        let first = registry.resolve(ProviderKind::Zhipu, "https://z.example", RelayMode::Embeddings);
        let second = registry.resolve(ProviderKind::Zhipu, "https://z.example", RelayMode::Embeddings);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_unregistered_provider() {
        let registry = ProviderRegistry::new().register(OpenAiAdaptor);
        let err = registry
            .resolve(ProviderKind::Zhipu, "https://z.example", RelayMode::ChatCompletions)
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::UnsupportedProvider {
                provider: ProviderKind::Zhipu
            }
        ));
    }

    #[test]
    fn test_unsupported_mode_passes_through() {
        let registry = ProviderRegistry::builtin();
        let err = registry
            .resolve(
                ProviderKind::AliBailian,
                "https://dashscope.aliyuncs.com",
                RelayMode::AudioSpeech,
            )
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedMode { .. }));
    }
}
