//! Credential validation by a real round trip.
//!
//! A validation is a full, billable call. Run it on explicit user action,
//! not on every render or startup.

use crate::{Client, InvocationRequest, ModelConfig};
use chrono::{DateTime, Utc};
use tracing::info;

const PROBE_PROMPT: &str = "Hello";
const PROBE_SYSTEM: &str =
    "This is an API key validation request. Reply with a short greeting.";

/// Result of [`Client::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub is_valid: bool,
    pub error: Option<String>,
    pub validated_at: DateTime<Utc>,
}

impl Validation {
    /// Record the outcome on a caller-owned config.
    pub fn apply(&self, config: &mut ModelConfig) {
        config.is_valid = Some(self.is_valid);
        config.last_validated = Some(self.validated_at);
    }
}

impl Client {
    /// Check that a config can complete a call.
    ///
    /// Any successful response counts as valid, whatever its content.
    pub async fn validate(&self, config: &ModelConfig) -> Validation {
        let request = InvocationRequest::new(config.clone(), PROBE_PROMPT).system(PROBE_SYSTEM);
        let result = self.invoke(&request).await;

        info!(
            config = %config.id,
            provider = %config.provider,
            valid = result.is_ok(),
            "validated model config"
        );

        Validation {
            is_valid: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
            validated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry::ProviderId;

    #[tokio::test]
    async fn missing_key_is_invalid() {
        let config = ModelConfig::new(ProviderId::Anthropic, "claude-3-haiku-20240307", "");
        let validation = Client::new().unwrap().validate(&config).await;
        assert!(!validation.is_valid);
        assert!(validation.error.unwrap().contains("no API key"));
    }

    #[test]
    fn apply_updates_config() {
        let mut config = ModelConfig::new(ProviderId::OpenAi, "gpt-4o", "sk");
        let validation = Validation {
            is_valid: true,
            error: None,
            validated_at: Utc::now(),
        };
        validation.apply(&mut config);
        assert_eq!(config.is_valid, Some(true));
        assert_eq!(config.last_validated, Some(validation.validated_at));
    }
}
