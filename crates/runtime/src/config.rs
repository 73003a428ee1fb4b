//! Model configuration consumed by every invocation.

use chrono::{DateTime, Utc};
use registry::ProviderId;
use serde::{Deserialize, Serialize};

/// A named binding of credential, provider, model and pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    pub provider: ProviderId,
    pub model_id: String,
    /// May be empty only for providers that do not need one.
    #[serde(default)]
    pub api_key: String,
    /// Full URL replacing the provider's default endpoint. For Google this
    /// is the API base that `/models/<model>:generateContent` is appended to.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub costs: Option<CostOverride>,
    /// Flat cost charged per call when no token pricing applies.
    #[serde(default)]
    pub cost_per_call: Option<f64>,
    #[serde(default)]
    pub free_tier: bool,
    /// Appended to the caller's system prompt on every call.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_valid: Option<bool>,
    #[serde(default)]
    pub last_validated: Option<DateTime<Utc>>,
}

impl ModelConfig {
    /// Create a config with the given credential and no optional settings.
    pub fn new(
        provider: ProviderId,
        model_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let model_id = model_id.into();
        Self {
            id: format!("{provider}:{model_id}"),
            name: model_id.clone(),
            provider,
            model_id,
            api_key: api_key.into(),
            endpoint: None,
            costs: None,
            cost_per_call: None,
            free_tier: false,
            system_prompt: None,
            tuning: Tuning::default(),
            is_default: false,
            is_valid: None,
            last_validated: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_costs(mut self, input_per_million: f64, output_per_million: f64) -> Self {
        self.costs = Some(CostOverride {
            input: Some(input_per_million),
            output: Some(output_per_million),
        });
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// The custom endpoint, ignoring blank values.
    pub(crate) fn custom_endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Per-model price override, USD per million tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostOverride {
    #[serde(default)]
    pub input: Option<f64>,
    #[serde(default)]
    pub output: Option<f64>,
}

impl CostOverride {
    /// Both rates, if both are set.
    pub fn rates(&self) -> Option<(f64, f64)> {
        self.input.zip(self.output)
    }
}

/// Sampling settings. Unset fields fall back to the wire family's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.7;

impl Tuning {
    pub(crate) fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub(crate) fn max_output_tokens(&self, family_default: u32) -> u32 {
        self.max_output_tokens.unwrap_or(family_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_needs_both_rates() {
        let partial = CostOverride {
            input: Some(1.0),
            output: None,
        };
        assert_eq!(partial.rates(), None);

        let full = CostOverride {
            input: Some(1.0),
            output: Some(2.0),
        };
        assert_eq!(full.rates(), Some((1.0, 2.0)));
    }

    #[test]
    fn blank_endpoint_is_ignored() {
        let config = ModelConfig::new(ProviderId::Azure, "gpt-4o", "key").with_endpoint("  ");
        assert_eq!(config.custom_endpoint(), None);
    }

    #[test]
    fn tuning_defaults() {
        let tuning = Tuning::default();
        assert_eq!(tuning.temperature(), 0.7);
        assert_eq!(tuning.max_output_tokens(4000), 4000);

        let tuning = Tuning {
            temperature: Some(0.1),
            max_output_tokens: Some(10),
        };
        assert_eq!(tuning.temperature(), 0.1);
        assert_eq!(tuning.max_output_tokens(4000), 10);
    }

    #[test]
    fn deserialize_minimal() {
        let json = r#"{"id":"a","name":"A","provider":"google","model_id":"gemini-1.5-flash"}"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.provider, ProviderId::Google);
        assert!(config.api_key.is_empty());
        assert!(!config.is_default);
    }
}
