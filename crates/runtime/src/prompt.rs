//! Assembly of the provider-neutral prompt.
//!
//! The current turn is always one text part (prompt, attached file text,
//! tool results, in that order) followed by zero or more image parts.

use crate::providers::Encoder;
use crate::request::{InvocationRequest, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One piece of the current turn's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    /// Image referenced by URL; for OpenAI-compatible providers this is a data URL.
    ImageByUrl { url: String },
    ImageInlineBase64 { mime_type: String, data: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Text { .. })
    }
}

/// Everything an encoder needs besides the target.
#[derive(Debug, Clone)]
pub(crate) struct Prompt<'a> {
    pub system: Option<String>,
    pub history: &'a [Turn],
    pub current: Vec<ContentPart>,
}

impl Prompt<'_> {
    pub(crate) fn has_images(&self) -> bool {
        self.current.iter().any(ContentPart::is_image)
    }
}

impl<'a> Prompt<'a> {
    pub(crate) fn build(request: &'a InvocationRequest, encoder: &dyn Encoder) -> Self {
        Self {
            system: effective_system(request),
            history: &request.history,
            current: current_turn(request, encoder),
        }
    }
}

/// Caller system prompt and model fragment, blank-line separated.
pub(crate) fn effective_system(request: &InvocationRequest) -> Option<String> {
    let parts: Vec<&str> = [
        request.system_prompt.as_deref(),
        request.config.system_prompt.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.trim().is_empty())
    .collect();

    (!parts.is_empty()).then(|| parts.join("\n\n"))
}

fn current_turn(request: &InvocationRequest, encoder: &dyn Encoder) -> Vec<ContentPart> {
    let mut text = request.prompt.clone();

    for file in &request.attachments {
        text.push_str(&format!(
            "\n\n--- Attached File: {} ---\n{}\n--- End of File ---",
            file.name, file.content
        ));
    }

    if let Some(results) = &request.tool_results {
        let json = serde_json::to_string_pretty(results).unwrap_or_else(|_| results.to_string());
        text.push_str(&format!(
            "\n\n--- Tool Results ---\n{json}\n--- End of Tool Results ---"
        ));
    }

    let mut parts = vec![ContentPart::Text { text }];
    let mut seen = HashSet::new();
    for image in request.attachments.iter().filter_map(|a| a.image()) {
        if seen.insert(image.key().to_string()) {
            parts.push(encoder.image_part(image));
        }
    }
    parts
}
