//! Mapping provider responses onto one result shape.
//!
//! When a provider omits usage metadata, token counts are estimated at
//! roughly four characters per token. The estimate is an approximation for
//! cost display only; it is never used when the provider reports real counts,
//! and results carry [`Usage::estimated`] so callers can tell the two apart.

use crate::providers::{Decoded, encoder_for};
use registry::ProviderId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CHARS_PER_TOKEN: usize = 4;

/// Token counts for one call.
///
/// `outgoing_tokens` are the tokens sent to the provider (the prompt) and
/// `incoming_tokens` the tokens received (the completion).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub incoming_tokens: u32,
    pub outgoing_tokens: u32,
    /// Counts were estimated from text length, not reported by the provider.
    pub estimated: bool,
}

impl Usage {
    /// Saturates rather than wrapping on huge estimates.
    pub fn total_tokens(&self) -> u32 {
        self.incoming_tokens.saturating_add(self.outgoing_tokens)
    }
}

/// Response text and usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub usage: Usage,
}

/// Rough token count for `text`: `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> u32 {
    let tokens = text.chars().count().div_ceil(CHARS_PER_TOKEN);
    u32::try_from(tokens).unwrap_or(u32::MAX)
}

/// Extract text and usage from a provider response.
///
/// `request_body` is the JSON that was sent; it is only read when the
/// response lacks usage metadata.
pub fn normalize(provider: ProviderId, raw: &Value, request_body: &Value) -> Normalized {
    let decoded = encoder_for(provider.family()).decode(raw);
    from_decoded(decoded, request_body)
}

pub(crate) fn from_decoded(decoded: Decoded, request_body: &Value) -> Normalized {
    let text = decoded.text.unwrap_or_default();
    let usage = match decoded.usage {
        Some((prompt, completion)) => Usage {
            incoming_tokens: completion,
            outgoing_tokens: prompt,
            estimated: false,
        },
        None => Usage {
            incoming_tokens: estimate_tokens(&text),
            outgoing_tokens: estimate_tokens(&request_body.to_string()),
            estimated: true,
        },
    };
    Normalized { text, usage }
}
