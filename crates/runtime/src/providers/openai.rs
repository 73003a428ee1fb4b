//! OpenAI-compatible chat completions.
//!
//! Covers OpenAI, Perplexity, Llama hosts, Grok, Qwen, DeepSeek and Azure.

use super::{Decoded, Encoder, Target, WireRequest, data_url, text_at, token_pair, turn_text};
use crate::prompt::{ContentPart, Prompt};
use crate::request::{ImageSource, Role};
use crate::{Error, Result};
use registry::ProviderId;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_MAX_TOKENS: u32 = 4000;
const GATEWAY_PATH: &str = "v1/chat/completions";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: ApiContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent<'a> {
    Text(&'a str),
    Parts(Vec<ApiPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Debug, Serialize)]
struct ApiImageUrl {
    url: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder Implementation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct OpenAiEncoder;

impl OpenAiEncoder {
    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn part_to_api(part: &ContentPart) -> ApiPart<'_> {
        match part {
            ContentPart::Text { text } => ApiPart::Text { text },
            ContentPart::ImageByUrl { url } => ApiPart::ImageUrl {
                image_url: ApiImageUrl { url: url.clone() },
            },
            ContentPart::ImageInlineBase64 { mime_type, data } => ApiPart::ImageUrl {
                image_url: ApiImageUrl {
                    url: data_url(mime_type, data),
                },
            },
        }
    }

    fn current_to_api<'a>(prompt: &'a Prompt<'_>) -> ApiContent<'a> {
        if prompt.has_images() {
            ApiContent::Parts(prompt.current.iter().map(Self::part_to_api).collect())
        } else {
            ApiContent::Text(turn_text(&prompt.current))
        }
    }
}

impl Encoder for OpenAiEncoder {
    fn image_part(&self, image: ImageSource<'_>) -> ContentPart {
        let url = match image {
            ImageSource::Inline { mime_type, data } => data_url(mime_type, data),
            ImageSource::Remote(url) => url.to_string(),
        };
        ContentPart::ImageByUrl { url }
    }

    fn encode(&self, target: &Target<'_>, prompt: &Prompt<'_>) -> Result<WireRequest> {
        let endpoint = target.resolve_endpoint(GATEWAY_PATH).ok_or_else(|| {
            Error::config(format!("{} requires a custom endpoint", target.provider))
        })?;

        let mut messages = Vec::with_capacity(prompt.history.len() + 2);
        if let Some(system) = &prompt.system {
            messages.push(ApiMessage {
                role: "system",
                content: ApiContent::Text(system),
            });
        }
        messages.extend(prompt.history.iter().map(|turn| ApiMessage {
            role: Self::role_to_api(turn.role),
            content: ApiContent::Text(&turn.text),
        }));
        messages.push(ApiMessage {
            role: "user",
            content: Self::current_to_api(prompt),
        });

        let request = ApiRequest {
            model: target.model,
            messages,
            max_tokens: target.tuning.max_output_tokens(DEFAULT_MAX_TOKENS),
            temperature: target.tuning.temperature(),
        };

        let mut headers = vec![
            ("authorization", format!("Bearer {}", target.api_key)),
            ("content-type", "application/json".to_string()),
        ];
        // Azure OpenAI authenticates keys through its own header.
        if target.provider == ProviderId::Azure {
            headers.push(("api-key", target.api_key.to_string()));
        }

        Ok(WireRequest {
            endpoint,
            headers,
            body: serde_json::to_value(&request).map_err(|e| Error::config(e.to_string()))?,
        })
    }

    fn decode(&self, body: &Value) -> Decoded {
        Decoded {
            text: text_at(body, "/choices/0/message/content"),
            usage: token_pair(body, "/usage/prompt_tokens", "/usage/completion_tokens"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::request::Turn;
    use serde_json::json;

    fn target(provider: ProviderId) -> Target<'static> {
        Target {
            provider,
            model: "gpt-4o",
            api_key: "sk-test",
            custom_endpoint: None,
            gateway: None,
            tuning: Tuning::default(),
        }
    }

    #[test]
    fn encodes_system_history_and_plain_turn() {
        let history = vec![Turn::user("Hi"), Turn::assistant("Hello!")];
        let prompt = Prompt {
            system: Some("Be brief.".into()),
            history: &history,
            current: vec![ContentPart::text("2+2?")],
        };
        let wire = OpenAiEncoder.encode(&target(ProviderId::OpenAi), &prompt).unwrap();

        assert_eq!(wire.endpoint, "https://api.openai.com/v1/chat/completions");
        assert!(wire
            .headers
            .contains(&("authorization", "Bearer sk-test".to_string())));
        assert_eq!(
            wire.body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hi"},
                    {"role": "assistant", "content": "Hello!"},
                    {"role": "user", "content": "2+2?"}
                ],
                "max_tokens": 4000,
                "temperature": 0.7
            })
        );
    }

    #[test]
    fn images_switch_to_structured_content() {
        let prompt = Prompt {
            system: None,
            history: &[],
            current: vec![
                ContentPart::text("Describe"),
                ContentPart::ImageByUrl {
                    url: "data:image/png;base64,AAAA".into(),
                },
            ],
        };
        let wire = OpenAiEncoder.encode(&target(ProviderId::OpenAi), &prompt).unwrap();
        assert_eq!(
            wire.body["messages"][0]["content"],
            json!([
                {"type": "text", "text": "Describe"},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
            ])
        );
    }

    #[test]
    fn tuning_overrides_defaults() {
        let prompt = Prompt {
            system: None,
            history: &[],
            current: vec![ContentPart::text("")],
        };
        let t = Target {
            tuning: Tuning {
                temperature: Some(0.25),
                max_output_tokens: Some(64),
            },
            ..target(ProviderId::DeepSeek)
        };
        let wire = OpenAiEncoder.encode(&t, &prompt).unwrap();
        assert_eq!(wire.body["max_tokens"], 64);
        assert_eq!(wire.body["temperature"], 0.25);
        assert_eq!(wire.body["messages"][0]["content"], "");
    }

    #[test]
    fn azure_without_endpoint_is_a_configuration_error() {
        let prompt = Prompt {
            system: None,
            history: &[],
            current: vec![ContentPart::text("hi")],
        };
        let err = OpenAiEncoder
            .encode(&target(ProviderId::Azure), &prompt)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn azure_sends_api_key_header() {
        let prompt = Prompt {
            system: None,
            history: &[],
            current: vec![ContentPart::text("hi")],
        };
        let t = Target {
            custom_endpoint: Some("https://res.openai.azure.com/openai/deployments/d/chat/completions"),
            ..target(ProviderId::Azure)
        };
        let wire = OpenAiEncoder.encode(&t, &prompt).unwrap();
        assert!(wire.headers.contains(&("api-key", "sk-test".to_string())));
    }

    #[test]
    fn decodes_text_and_usage() {
        let body = json!({
            "choices": [{"message": {"content": "4"}}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 1}
        });
        assert_eq!(
            OpenAiEncoder.decode(&body),
            Decoded {
                text: Some("4".into()),
                usage: Some((5, 1)),
            }
        );
    }

    #[test]
    fn decode_keeps_text_and_usage_independent() {
        let body = json!({
            "choices": null,
            "usage": {"prompt_tokens": 5, "completion_tokens": 1}
        });
        assert_eq!(OpenAiEncoder.decode(&body).usage, Some((5, 1)));

        let body = json!({
            "choices": [{"message": {"content": "4"}}],
            "usage": {"prompt_tokens": "5", "completion_tokens": 1}
        });
        assert_eq!(
            OpenAiEncoder.decode(&body),
            Decoded {
                text: Some("4".into()),
                usage: None,
            }
        );
    }

    #[test]
    fn decode_tolerates_missing_fields() {
        assert_eq!(OpenAiEncoder.decode(&json!({})), Decoded::default());
        assert_eq!(
            OpenAiEncoder.decode(&json!({"choices": [{"message": {"content": null}}]})),
            Decoded::default()
        );
        assert_eq!(
            OpenAiEncoder.decode(&json!({"usage": {"prompt_tokens": 3}})),
            Decoded::default()
        );
    }
}
