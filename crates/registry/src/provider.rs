//! Provider identifiers and descriptors.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A supported upstream LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Perplexity,
    Meta,
    Grok,
    Qwen,
    DeepSeek,
    Azure,
    Google,
    Anthropic,
}

/// The wire protocol a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFamily {
    /// `POST /chat/completions` with bearer auth.
    OpenAiCompatible,
    /// Gemini `generateContent`.
    Google,
    /// Anthropic Messages API.
    Anthropic,
}

impl ProviderId {
    pub const ALL: [ProviderId; 9] = [
        ProviderId::OpenAi,
        ProviderId::Perplexity,
        ProviderId::Meta,
        ProviderId::Grok,
        ProviderId::Qwen,
        ProviderId::DeepSeek,
        ProviderId::Azure,
        ProviderId::Google,
        ProviderId::Anthropic,
    ];

    /// Stable lowercase identifier, as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Perplexity => "perplexity",
            Self::Meta => "meta",
            Self::Grok => "grok",
            Self::Qwen => "qwen",
            Self::DeepSeek => "deepseek",
            Self::Azure => "azure",
            Self::Google => "google",
            Self::Anthropic => "anthropic",
        }
    }

    /// Wire protocol used to talk to this provider.
    pub fn family(self) -> WireFamily {
        match self {
            Self::OpenAi
            | Self::Perplexity
            | Self::Meta
            | Self::Grok
            | Self::Qwen
            | Self::DeepSeek
            | Self::Azure => WireFamily::OpenAiCompatible,
            Self::Google => WireFamily::Google,
            Self::Anthropic => WireFamily::Anthropic,
        }
    }

    /// Static descriptor for this provider.
    pub fn descriptor(self) -> &'static ProviderDescriptor {
        &PROVIDERS[self as usize]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::UnknownProvider(s.to_string()))
    }
}

/// Static metadata about a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub display_name: &'static str,
    /// Provider home page.
    pub site_url: &'static str,
    /// Where users obtain a credential.
    pub key_url: &'static str,
    pub tutorial_url: Option<&'static str>,
    pub default_model: &'static str,
    /// Requests fail before any network call unless the model config
    /// supplies its own endpoint.
    pub requires_endpoint: bool,
    /// Official endpoint used when neither a gateway nor a custom endpoint
    /// is configured. For Google this is the API base, not the full URL.
    pub direct_endpoint: Option<&'static str>,
    pub note: &'static str,
}

impl ProviderDescriptor {
    /// Path segment used when routing through a gateway.
    pub fn gateway_slug(&self) -> &'static str {
        self.id.as_str()
    }
}

// The order here matches `ProviderId::ALL`.
static PROVIDERS: [ProviderDescriptor; 9] = [
    ProviderDescriptor {
        id: ProviderId::OpenAi,
        display_name: "OpenAI",
        site_url: "https://openai.com",
        key_url: "https://platform.openai.com/api-keys",
        tutorial_url: Some("https://platform.openai.com/docs/quickstart"),
        default_model: "gpt-4o-mini",
        requires_endpoint: false,
        direct_endpoint: Some("https://api.openai.com/v1/chat/completions"),
        note: "Reference implementation of the chat completions format.",
    },
    ProviderDescriptor {
        id: ProviderId::Perplexity,
        display_name: "Perplexity",
        site_url: "https://www.perplexity.ai",
        key_url: "https://www.perplexity.ai/settings/api",
        tutorial_url: None,
        default_model: "sonar",
        requires_endpoint: false,
        direct_endpoint: Some("https://api.perplexity.ai/chat/completions"),
        note: "OpenAI-compatible. Responses include web search results.",
    },
    ProviderDescriptor {
        id: ProviderId::Meta,
        display_name: "Meta Llama",
        site_url: "https://llama.meta.com",
        key_url: "https://api.together.xyz/settings/api-keys",
        tutorial_url: None,
        default_model: "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
        requires_endpoint: false,
        direct_endpoint: Some("https://api.together.xyz/v1/chat/completions"),
        note: "Llama is served by third-party hosts. Defaults to Together AI; set a custom endpoint for others.",
    },
    ProviderDescriptor {
        id: ProviderId::Grok,
        display_name: "Grok (xAI)",
        site_url: "https://x.ai",
        key_url: "https://console.x.ai",
        tutorial_url: None,
        default_model: "grok-2-latest",
        requires_endpoint: false,
        direct_endpoint: Some("https://api.x.ai/v1/chat/completions"),
        note: "OpenAI-compatible.",
    },
    ProviderDescriptor {
        id: ProviderId::Qwen,
        display_name: "Qwen (Alibaba Cloud)",
        site_url: "https://qwenlm.github.io",
        key_url: "https://bailian.console.alibabacloud.com/?apiKey=1",
        tutorial_url: None,
        default_model: "qwen-plus",
        requires_endpoint: false,
        direct_endpoint: Some(
            "https://dashscope-intl.aliyuncs.com/compatible-mode/v1/chat/completions",
        ),
        note: "OpenAI-compatible mode of DashScope.",
    },
    ProviderDescriptor {
        id: ProviderId::DeepSeek,
        display_name: "DeepSeek",
        site_url: "https://www.deepseek.com",
        key_url: "https://platform.deepseek.com/api_keys",
        tutorial_url: None,
        default_model: "deepseek-chat",
        requires_endpoint: false,
        direct_endpoint: Some("https://api.deepseek.com/chat/completions"),
        note: "OpenAI-compatible.",
    },
    ProviderDescriptor {
        id: ProviderId::Azure,
        display_name: "Azure OpenAI (Microsoft)",
        site_url: "https://azure.microsoft.com/products/ai-services/openai-service",
        key_url: "https://portal.azure.com",
        tutorial_url: Some("https://learn.microsoft.com/azure/ai-services/openai/quickstart"),
        default_model: "gpt-4o",
        requires_endpoint: true,
        direct_endpoint: None,
        note: "Requires the full deployment URL of an Azure OpenAI resource, including api-version.",
    },
    ProviderDescriptor {
        id: ProviderId::Google,
        display_name: "Google Gemini",
        site_url: "https://ai.google.dev",
        key_url: "https://aistudio.google.com/app/apikey",
        tutorial_url: Some("https://ai.google.dev/gemini-api/docs/quickstart"),
        default_model: "gemini-1.5-flash",
        requires_endpoint: false,
        direct_endpoint: Some("https://generativelanguage.googleapis.com/v1beta"),
        note: "Uses generateContent. The API key travels as a query parameter.",
    },
    ProviderDescriptor {
        id: ProviderId::Anthropic,
        display_name: "Anthropic Claude",
        site_url: "https://www.anthropic.com",
        key_url: "https://console.anthropic.com/settings/keys",
        tutorial_url: Some("https://docs.anthropic.com/en/docs/quickstart"),
        default_model: "claude-3-5-sonnet-20241022",
        requires_endpoint: false,
        direct_endpoint: Some("https://api.anthropic.com/v1/messages"),
        note: "Messages API. System prompt is a top-level field.",
    },
];

/// All provider descriptors, in display order.
pub fn providers() -> &'static [ProviderDescriptor] {
    &PROVIDERS
}

/// Look up a provider by its configuration identifier.
pub fn lookup_provider(id: &str) -> Option<&'static ProviderDescriptor> {
    id.parse::<ProviderId>().ok().map(ProviderId::descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_id_has_its_own_descriptor() {
        for id in ProviderId::ALL {
            assert_eq!(id.descriptor().id, id);
        }
        assert_eq!(providers().len(), ProviderId::ALL.len());
    }

    #[test]
    fn parse_round_trips_display() {
        for id in ProviderId::ALL {
            assert_eq!(id.to_string().parse::<ProviderId>(), Ok(id));
        }
    }

    #[test]
    fn unknown_provider_is_absent() {
        assert!(lookup_provider("mistral").is_none());
        assert_eq!(
            "OpenAI".parse::<ProviderId>(),
            Err(Error::UnknownProvider("OpenAI".into()))
        );
    }

    #[test]
    fn families() {
        assert_eq!(ProviderId::Azure.family(), WireFamily::OpenAiCompatible);
        assert_eq!(ProviderId::DeepSeek.family(), WireFamily::OpenAiCompatible);
        assert_eq!(ProviderId::Google.family(), WireFamily::Google);
        assert_eq!(ProviderId::Anthropic.family(), WireFamily::Anthropic);
    }

    #[test]
    fn only_azure_requires_endpoint() {
        let required: Vec<_> = providers()
            .iter()
            .filter(|d| d.requires_endpoint)
            .map(|d| d.id)
            .collect();
        assert_eq!(required, vec![ProviderId::Azure]);
        assert!(ProviderId::Azure.descriptor().direct_endpoint.is_none());
    }

    #[test]
    fn serde_uses_config_identifiers() {
        let json = serde_json::to_string(&ProviderId::DeepSeek).unwrap();
        assert_eq!(json, "\"deepseek\"");
        let id: ProviderId = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(id, ProviderId::OpenAi);
    }
}
