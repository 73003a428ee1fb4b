//! Wire encoders, one per protocol family.
//!
//! Each encoder turns the provider-neutral [`Prompt`] into the exact HTTP
//! request its family expects, and pulls text and usage back out of the
//! family's response JSON.

mod anthropic;
mod google;
mod openai;

use crate::config::Tuning;
use crate::prompt::{ContentPart, Prompt};
use crate::request::ImageSource;
use crate::Result;
use registry::{ProviderId, WireFamily};
use serde_json::Value;

pub(crate) use anthropic::AnthropicEncoder;
pub(crate) use google::GoogleEncoder;
pub(crate) use openai::OpenAiEncoder;

/// A fully encoded HTTP request.
#[derive(Debug, Clone)]
pub(crate) struct WireRequest {
    pub endpoint: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Where and as whom a request is sent.
#[derive(Debug, Clone)]
pub(crate) struct Target<'a> {
    pub provider: ProviderId,
    pub model: &'a str,
    pub api_key: &'a str,
    /// Model config endpoint, already trimmed.
    pub custom_endpoint: Option<&'a str>,
    /// Gateway base URL from the client, if any.
    pub gateway: Option<&'a str>,
    pub tuning: Tuning,
}

impl Target<'_> {
    /// Custom endpoint, else `<gateway>/<slug>/<path>`, else the provider's own.
    fn resolve_endpoint(&self, gateway_path: &str) -> Option<String> {
        if let Some(endpoint) = self.custom_endpoint {
            return Some(endpoint.to_string());
        }
        if let Some(gateway) = self.gateway {
            let slug = self.provider.descriptor().gateway_slug();
            return Some(format!(
                "{}/{slug}/{gateway_path}",
                gateway.trim_end_matches('/')
            ));
        }
        self.provider.descriptor().direct_endpoint.map(str::to_string)
    }
}

/// Text and token counts as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub text: Option<String>,
    /// `(prompt_tokens, completion_tokens)`, only when both are reported.
    pub usage: Option<(u32, u32)>,
}

/// A protocol family's request/response mapping.
pub(crate) trait Encoder: Send + Sync {
    /// How an attached image is represented in this family.
    fn image_part(&self, image: ImageSource<'_>) -> ContentPart;

    fn encode(&self, target: &Target<'_>, prompt: &Prompt<'_>) -> Result<WireRequest>;

    /// Lenient: missing fields become `None`, never an error.
    fn decode(&self, body: &Value) -> Decoded;
}

static OPENAI: OpenAiEncoder = OpenAiEncoder;
static GOOGLE: GoogleEncoder = GoogleEncoder;
static ANTHROPIC: AnthropicEncoder = AnthropicEncoder;

/// The encoder for a wire family.
pub(crate) fn encoder_for(family: WireFamily) -> &'static dyn Encoder {
    match family {
        WireFamily::OpenAiCompatible => &OPENAI,
        WireFamily::Google => &GOOGLE,
        WireFamily::Anthropic => &ANTHROPIC,
    }
}

/// The first text part of the current turn, or an empty string.
fn turn_text(parts: &[ContentPart]) -> &str {
    parts
        .iter()
        .find_map(|p| match p {
            ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .unwrap_or("")
}

/// The string at a JSON pointer, if present.
fn text_at(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Prompt and completion counts, only when both are present as integers.
fn token_pair(body: &Value, prompt: &str, completion: &str) -> Option<(u32, u32)> {
    let count = |pointer: &str| {
        body.pointer(pointer)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };
    count(prompt).zip(count(completion))
}

fn data_url(mime_type: &str, data: &str) -> String {
    format!("data:{mime_type};base64,{data}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(provider: ProviderId) -> Target<'static> {
        Target {
            provider,
            model: "m",
            api_key: "k",
            custom_endpoint: None,
            gateway: None,
            tuning: Tuning::default(),
        }
    }

    #[test]
    fn custom_endpoint_wins() {
        let t = Target {
            custom_endpoint: Some("http://localhost:9000/v1/chat/completions"),
            gateway: Some("https://gw.example.com"),
            ..target(ProviderId::OpenAi)
        };
        assert_eq!(
            t.resolve_endpoint("v1/chat/completions").as_deref(),
            Some("http://localhost:9000/v1/chat/completions")
        );
    }

    #[test]
    fn gateway_path_uses_provider_slug() {
        let t = Target {
            gateway: Some("https://gw.example.com/"),
            ..target(ProviderId::DeepSeek)
        };
        assert_eq!(
            t.resolve_endpoint("v1/chat/completions").as_deref(),
            Some("https://gw.example.com/deepseek/v1/chat/completions")
        );
    }

    #[test]
    fn direct_endpoint_without_gateway() {
        assert_eq!(
            target(ProviderId::Grok)
                .resolve_endpoint("v1/chat/completions")
                .as_deref(),
            Some("https://api.x.ai/v1/chat/completions")
        );
        assert_eq!(
            target(ProviderId::Azure).resolve_endpoint("v1/chat/completions"),
            None
        );
    }

    #[test]
    fn token_pair_needs_both_integers() {
        let body = serde_json::json!({"u": {"a": 3, "b": 4, "c": "5", "d": -1}});
        assert_eq!(token_pair(&body, "/u/a", "/u/b"), Some((3, 4)));
        assert_eq!(token_pair(&body, "/u/a", "/u/c"), None);
        assert_eq!(token_pair(&body, "/u/a", "/u/d"), None);
        assert_eq!(token_pair(&body, "/u/a", "/u/missing"), None);
    }

    #[test]
    fn every_provider_dispatches_to_its_family() {
        for id in ProviderId::ALL {
            let encoder = encoder_for(id.family());
            let part = encoder.image_part(ImageSource::Inline {
                mime_type: "image/png",
                data: "AAAA",
            });
            let expected = match id {
                ProviderId::Google | ProviderId::Anthropic => ContentPart::ImageInlineBase64 {
                    mime_type: "image/png".into(),
                    data: "AAAA".into(),
                },
                _ => ContentPart::ImageByUrl {
                    url: "data:image/png;base64,AAAA".into(),
                },
            };
            assert_eq!(part, expected, "{id}");
        }
    }
}
