//! Anthropic Messages API.

use super::{Decoded, Encoder, Target, WireRequest, text_at, token_pair, turn_text};
use crate::prompt::{ContentPart, Prompt};
use crate::request::{ImageSource, Role};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const GATEWAY_PATH: &str = "v1/messages";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
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
    Blocks(Vec<ApiContentBlock<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock<'a> {
    Text { text: &'a str },
    Image { source: ApiImageSource<'a> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiImageSource<'a> {
    Base64 { media_type: &'a str, data: &'a str },
    Url { url: &'a str },
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder Implementation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct AnthropicEncoder;

impl AnthropicEncoder {
    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User | Role::System => "user",
            Role::Assistant => "assistant",
        }
    }

    fn block_to_api(part: &ContentPart) -> ApiContentBlock<'_> {
        match part {
            ContentPart::Text { text } => ApiContentBlock::Text { text },
            ContentPart::ImageInlineBase64 { mime_type, data } => ApiContentBlock::Image {
                source: ApiImageSource::Base64 {
                    media_type: mime_type,
                    data,
                },
            },
            ContentPart::ImageByUrl { url } => ApiContentBlock::Image {
                source: ApiImageSource::Url { url },
            },
        }
    }

    fn current_to_api<'a>(prompt: &'a Prompt<'_>) -> ApiContent<'a> {
        if prompt.has_images() {
            ApiContent::Blocks(prompt.current.iter().map(Self::block_to_api).collect())
        } else {
            ApiContent::Text(turn_text(&prompt.current))
        }
    }
}

impl Encoder for AnthropicEncoder {
    fn image_part(&self, image: ImageSource<'_>) -> ContentPart {
        match image {
            ImageSource::Inline { mime_type, data } => ContentPart::ImageInlineBase64 {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            },
            ImageSource::Remote(url) => ContentPart::ImageByUrl {
                url: url.to_string(),
            },
        }
    }

    fn encode(&self, target: &Target<'_>, prompt: &Prompt<'_>) -> Result<WireRequest> {
        let endpoint = target
            .resolve_endpoint(GATEWAY_PATH)
            .ok_or_else(|| Error::config("no Anthropic endpoint configured"))?;

        let mut messages: Vec<ApiMessage<'_>> = prompt
            .history
            .iter()
            .filter(|turn| turn.role != Role::System)
            .map(|turn| ApiMessage {
                role: Self::role_to_api(turn.role),
                content: ApiContent::Text(&turn.text),
            })
            .collect();
        messages.push(ApiMessage {
            role: "user",
            content: Self::current_to_api(prompt),
        });

        let request = ApiRequest {
            model: target.model,
            messages,
            max_tokens: target.tuning.max_output_tokens(DEFAULT_MAX_TOKENS),
            temperature: target.tuning.temperature(),
            system: prompt.system.as_deref(),
        };

        Ok(WireRequest {
            endpoint,
            headers: vec![
                ("x-api-key", target.api_key.to_string()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
                ("content-type", "application/json".to_string()),
                ("accept", "application/json".to_string()),
            ],
            body: serde_json::to_value(&request).map_err(|e| Error::config(e.to_string()))?,
        })
    }

    fn decode(&self, body: &Value) -> Decoded {
        Decoded {
            text: text_at(body, "/content/0/text"),
            usage: token_pair(body, "/usage/input_tokens", "/usage/output_tokens"),
        }
    }
}
