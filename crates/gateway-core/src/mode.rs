//! Relay modes: the abstract operation a caller asks for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Abstract operation kind, independent of the provider that serves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayMode {
    /// Path did not match any known operation.
    Unknown,
    /// Chat completion.
    ChatCompletions,
    /// Legacy text completion.
    Completions,
    /// Embedding vectors.
    Embeddings,
    /// Content moderation.
    Moderations,
    /// Image generation.
    ImagesGenerations,
    /// Legacy edits.
    Edits,
    /// Text to speech.
    AudioSpeech,
    /// Speech to text.
    AudioTranscription,
    /// Speech translation.
    AudioTranslation,
}

impl RelayMode {
    /// All routable modes, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::ChatCompletions,
        Self::Completions,
        Self::Embeddings,
        Self::Moderations,
        Self::ImagesGenerations,
        Self::Edits,
        Self::AudioSpeech,
        Self::AudioTranscription,
        Self::AudioTranslation,
    ];

    /// Map an inbound request path to a mode.
    ///
    /// Matching is by prefix so query strings and sub-paths resolve to the
    /// same mode. Engine-scoped embedding paths (`/v1/engines/{model}/embeddings`)
    /// resolve to [`RelayMode::Embeddings`].
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        const PREFIXES: [(&str, RelayMode); 9] = [
            ("/v1/chat/completions", RelayMode::ChatCompletions),
            ("/v1/completions", RelayMode::Completions),
            ("/v1/embeddings", RelayMode::Embeddings),
            ("/v1/moderations", RelayMode::Moderations),
            ("/v1/images/generations", RelayMode::ImagesGenerations),
            ("/v1/edits", RelayMode::Edits),
            ("/v1/audio/speech", RelayMode::AudioSpeech),
            ("/v1/audio/transcriptions", RelayMode::AudioTranscription),
            ("/v1/audio/translations", RelayMode::AudioTranslation),
        ];

        if let Some((_, mode)) = PREFIXES.iter().find(|(prefix, _)| path.starts_with(prefix)) {
            return *mode;
        }
        if path.trim_end_matches('/').ends_with("embeddings") {
            return Self::Embeddings;
        }
        Self::Unknown
    }

    /// Stable snake_case name, identical to the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::ChatCompletions => "chat_completions",
            Self::Completions => "completions",
            Self::Embeddings => "embeddings",
            Self::Moderations => "moderations",
            Self::ImagesGenerations => "images_generations",
            Self::Edits => "edits",
            Self::AudioSpeech => "audio_speech",
            Self::AudioTranscription => "audio_transcription",
            Self::AudioTranslation => "audio_translation",
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
