//! Google Gemini `generateContent`.

use super::{Decoded, Encoder, Target, WireRequest, text_at, token_pair};
use crate::prompt::{ContentPart, Prompt};
use crate::request::{ImageSource, Role};
use crate::{Error, Result};
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    contents: Vec<ApiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: ApiGenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiContent<'a> {
    role: &'static str,
    parts: Vec<ApiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiPart<'a> {
    Text { text: &'a str },
    InlineData { inline_data: ApiBlob<'a> },
    FileData { file_data: ApiFileData<'a> },
}

#[derive(Debug, Serialize)]
struct ApiBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiFileData<'a> {
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction<'a> {
    parts: Vec<ApiPart<'a>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder Implementation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct GoogleEncoder;

impl GoogleEncoder {
    /// System turns are carried by `system_instruction`, not `contents`.
    fn role_to_api(role: Role) -> Option<&'static str> {
        match role {
            Role::User => Some("user"),
            Role::Assistant => Some("model"),
            Role::System => None,
        }
    }

    fn part_to_api(part: &ContentPart) -> ApiPart<'_> {
        match part {
            ContentPart::Text { text } => ApiPart::Text { text },
            ContentPart::ImageInlineBase64 { mime_type, data } => ApiPart::InlineData {
                inline_data: ApiBlob { mime_type, data },
            },
            ContentPart::ImageByUrl { url } => ApiPart::FileData {
                file_data: ApiFileData { file_uri: url },
            },
        }
    }

    fn endpoint(target: &Target<'_>) -> Result<String> {
        let base = target
            .custom_endpoint
            .or(target.provider.descriptor().direct_endpoint)
            .ok_or_else(|| Error::config("no Google API base configured"))?;

        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            base.trim_end_matches('/'),
            target.model
        ))
        .map_err(|e| Error::config(format!("invalid endpoint {base}: {e}")))?;
        url.query_pairs_mut().append_pair("key", target.api_key);
        Ok(url.into())
    }
}

impl Encoder for GoogleEncoder {
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
        let endpoint = Self::endpoint(target)?;

        let mut contents: Vec<ApiContent<'_>> = prompt
            .history
            .iter()
            .filter_map(|turn| {
                Some(ApiContent {
                    role: Self::role_to_api(turn.role)?,
                    parts: vec![ApiPart::Text { text: &turn.text }],
                })
            })
            .collect();
        contents.push(ApiContent {
            role: "user",
            parts: prompt.current.iter().map(Self::part_to_api).collect(),
        });

        let request = ApiRequest {
            contents,
            generation_config: ApiGenerationConfig {
                temperature: target.tuning.temperature(),
                max_output_tokens: target.tuning.max_output_tokens(DEFAULT_MAX_OUTPUT_TOKENS),
            },
            system_instruction: prompt.system.as_deref().map(|text| ApiSystemInstruction {
                parts: vec![ApiPart::Text { text }],
            }),
        };

        Ok(WireRequest {
            endpoint,
            headers: vec![("content-type", "application/json".to_string())],
            body: serde_json::to_value(&request).map_err(|e| Error::config(e.to_string()))?,
        })
    }

    fn decode(&self, body: &Value) -> Decoded {
        Decoded {
            text: text_at(body, "/candidates/0/content/parts/0/text"),
            usage: token_pair(
                body,
                "/usageMetadata/promptTokenCount",
                "/usageMetadata/candidatesTokenCount",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::request::Turn;
    use registry::ProviderId;
    use serde_json::json;

    fn target() -> Target<'static> {
        Target {
            provider: ProviderId::Google,
            model: "gemini-1.5-flash",
            api_key: "AIza-test",
            custom_endpoint: None,
            gateway: Some("https://gw.example.com"),
            tuning: Tuning::default(),
        }
    }

    #[test]
    fn endpoint_embeds_model_and_key() {
        let prompt = Prompt {
            system: None,
            history: &[],
            current: vec![ContentPart::text("hi")],
        };
        let wire = GoogleEncoder.encode(&target(), &prompt).unwrap();
        assert_eq!(
            wire.endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=AIza-test"
        );
        assert!(!wire.headers.iter().any(|(name, _)| *name == "authorization"));
    }

    #[test]
    fn custom_base_is_respected() {
        let prompt = Prompt {
            system: None,
            history: &[],
            current: vec![ContentPart::text("hi")],
        };
        let t = Target {
            custom_endpoint: Some("http://127.0.0.1:8080/v1beta/"),
            ..target()
        };
        let wire = GoogleEncoder.encode(&t, &prompt).unwrap();
        assert_eq!(
            wire.endpoint,
            "http://127.0.0.1:8080/v1beta/models/gemini-1.5-flash:generateContent?key=AIza-test"
        );
    }

    #[test]
    fn encodes_contents_and_system_instruction() {
        let history = vec![
            Turn::user("Hi"),
            Turn::new(Role::System, "ignored"),
            Turn::assistant("Hello!"),
        ];
        let prompt = Prompt {
            system: Some("Be brief.".into()),
            history: &history,
            current: vec![
                ContentPart::text("What is this?"),
                ContentPart::ImageInlineBase64 {
                    mime_type: "image/png".into(),
                    data: "AAAA".into(),
                },
            ],
        };
        let wire = GoogleEncoder.encode(&target(), &prompt).unwrap();
        assert_eq!(
            wire.body,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "Hi"}]},
                    {"role": "model", "parts": [{"text": "Hello!"}]},
                    {"role": "user", "parts": [
                        {"text": "What is this?"},
                        {"inline_data": {"mime_type": "image/png", "data": "AAAA"}}
                    ]}
                ],
                "generationConfig": {"temperature": 0.7, "maxOutputTokens": 2048},
                "system_instruction": {"parts": [{"text": "Be brief."}]}
            })
        );
    }

    #[test]
    fn decodes_text_and_usage() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "4"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 2}
        });
        assert_eq!(
            GoogleEncoder.decode(&body),
            Decoded {
                text: Some("4".into()),
                usage: Some((7, 2)),
            }
        );
    }

    #[test]
    fn decode_keeps_usage_when_candidates_are_malformed() {
        let body = json!({
            "candidates": {"unexpected": true},
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 0}
        });
        assert_eq!(
            GoogleEncoder.decode(&body),
            Decoded {
                text: None,
                usage: Some((7, 0)),
            }
        );
    }

    #[test]
    fn decode_tolerates_blocked_candidates() {
        let body = json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert_eq!(GoogleEncoder.decode(&body), Decoded::default());
    }
}
