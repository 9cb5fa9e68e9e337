//! Provider identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of an upstream provider.
///
/// Each kind has exactly one adaptor in the provider registry; the enum is the
/// registry key and the identity reported in dispatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// OpenAI and OpenAI-compatible services.
    #[serde(rename = "openai")]
    OpenAI,
    /// Alibaba DashScope native API.
    Ali,
    /// Alibaba Bailian OpenAI-compatible mode.
    AliBailian,
    /// Zhipu BigModel.
    Zhipu,
}

impl ProviderKind {
    /// Stable identifier, identical to the serde representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ali => "ali",
            Self::AliBailian => "ali-bailian",
            Self::Zhipu => "zhipu",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ali" | "dashscope" => Ok(Self::Ali),
            "ali-bailian" | "alibailian" | "bailian" => Ok(Self::AliBailian),
            "zhipu" => Ok(Self::Zhipu),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}
