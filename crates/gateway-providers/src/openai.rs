//! OpenAI and OpenAI-compatible services.

use crate::adaptor::ProviderAdaptor;
use gateway_core::{ProviderKind, RelayMode};

const ROUTES: &[(RelayMode, &str)] = &[
    (RelayMode::ChatCompletions, "/v1/chat/completions"),
    (RelayMode::Completions, "/v1/completions"),
    (RelayMode::Embeddings, "/v1/embeddings"),
    (RelayMode::Moderations, "/v1/moderations"),
    (RelayMode::ImagesGenerations, "/v1/images/generations"),
    (RelayMode::Edits, "/v1/edits"),
    (RelayMode::AudioSpeech, "/v1/audio/speech"),
    (RelayMode::AudioTranscription, "/v1/audio/transcriptions"),
    (RelayMode::AudioTranslation, "/v1/audio/translations"),
];

/// Adaptor for the OpenAI API.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiAdaptor;

impl ProviderAdaptor for OpenAiAdaptor {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn routes(&self) -> &'static [(RelayMode, &'static str)] {
        ROUTES
    }

    fn default_base_url(&self) -> &'static str {
        "https://api.openai.com"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_mode_routed() {
        for mode in RelayMode::ALL {
            assert!(OpenAiAdaptor.supports(mode), "{mode} not routed");
        }
        assert!(!OpenAiAdaptor.supports(RelayMode::Unknown));
    }

    #[test]
    fn test_chat_url() {
        let url = OpenAiAdaptor
            .resolve_endpoint(OpenAiAdaptor.default_base_url(), RelayMode::ChatCompletions)
            .unwrap();
        assert_eq!(url, "https://api.openai.com/v1/chat/completions");
    }
}
