//! Configuration loading from switchboard.toml.

use registry::ProviderId;
use runtime::{CostOverride, ModelConfig, Tuning};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Gateway base URL. Calls go straight to each provider when unset.
    pub gateway: Option<String>,

    /// Default per-call timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Ledger database path. Defaults to the user data directory.
    pub ledger: Option<PathBuf>,

    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

/// One configured model.
#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,

    /// Display name. Defaults to the id.
    pub name: Option<String>,

    /// Provider id, e.g. "openai" or "google".
    pub provider: String,

    /// Model id sent to the provider. Defaults to the provider's default model.
    pub model: Option<String>,

    /// Literal API key.
    /// Mutually exclusive with api_key_env.
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    /// Mutually exclusive with api_key.
    pub api_key_env: Option<String>,

    pub endpoint: Option<String>,

    #[serde(default)]
    pub default: bool,

    pub system_prompt: Option<String>,

    pub cost_per_call: Option<f64>,

    pub costs: Option<CostOverride>,

    #[serde(default)]
    pub tuning: Tuning,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolve every entry into a runtime config, reading credentials from
    /// the environment where asked.
    pub fn models(&self) -> Result<Vec<ModelConfig>, ConfigError> {
        self.models_with(|name| std::env::var(name).ok())
    }

    fn models_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Vec<ModelConfig>, ConfigError> {
        let mut seen = HashSet::new();
        self.models
            .iter()
            .map(|entry| {
                if !seen.insert(entry.id.as_str()) {
                    return Err(ConfigError::DuplicateModel(entry.id.clone()));
                }
                entry.resolve(&env)
            })
            .collect()
    }
}

impl ModelEntry {
    fn resolve(&self, env: &impl Fn(&str) -> Option<String>) -> Result<ModelConfig, ConfigError> {
        let provider: ProviderId =
            self.provider
                .parse()
                .map_err(|_| ConfigError::UnknownProvider {
                    model: self.id.clone(),
                    provider: self.provider.clone(),
                })?;

        let model_id = self
            .model
            .clone()
            .unwrap_or_else(|| provider.descriptor().default_model.to_string());

        let mut config = ModelConfig::new(provider, model_id, self.credential(env)?);
        config.id = self.id.clone();
        config.name = self.name.clone().unwrap_or_else(|| self.id.clone());
        config.endpoint = self.endpoint.clone();
        config.is_default = self.default;
        config.system_prompt = self.system_prompt.clone();
        config.cost_per_call = self.cost_per_call;
        config.costs = self.costs;
        config.tuning = self.tuning;
        Ok(config)
    }

    /// The API key. At most one source may be set; an unset or empty key is
    /// left for the runtime to reject at call time.
    fn credential(&self, env: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
        match (&self.api_key, &self.api_key_env) {
            (Some(key), None) => Ok(key.clone()),
            (None, Some(var)) => Ok(env(var).unwrap_or_else(|| {
                warn!(model = %self.id, var = %var, "API key variable is not set");
                String::new()
            })),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousCredential(self.id.clone())),
            (None, None) => Ok(String::new()),
        }
    }
}

/// Pick a model by id, or the default one.
///
/// Without an id, the first entry marked `default` wins, then the first entry.
pub fn select<'a>(models: &'a [ModelConfig], id: Option<&str>) -> Result<&'a ModelConfig, ConfigError> {
    match id {
        Some(id) => models
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ConfigError::UnknownModel(id.to_string())),
        None => models
            .iter()
            .find(|m| m.is_default)
            .or_else(|| models.first())
            .ok_or(ConfigError::NoModels),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("model '{model}': unknown provider '{provider}'")]
    UnknownProvider { model: String, provider: String },

    #[error("ambiguous credential for model '{0}': set either api_key OR api_key_env, not both")]
    AmbiguousCredential(String),

    #[error("model '{0}' is configured more than once")]
    DuplicateModel(String),

    #[error("no model named '{0}' in config")]
    UnknownModel(String),

    #[error("no models configured: add a [[models]] entry")]
    NoModels,
}
