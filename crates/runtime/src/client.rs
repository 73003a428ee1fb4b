//! The invocation entry point.

use crate::config::ModelConfig;
use crate::cost::cost_of;
use crate::normalize::{Usage, from_decoded};
use crate::prompt::Prompt;
use crate::providers::{Target, encoder_for};
use crate::request::InvocationRequest;
use crate::{Error, Result, transport};
use futures::future::join_all;
use registry::ProviderId;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Timeout applied when the caller does not pass one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub text: String,
    pub usage: Usage,
    /// Currency units, not cents.
    pub cost: f64,
    pub model_id: String,
    pub provider: ProviderId,
    pub elapsed: Duration,
}

/// Builder for a [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    gateway: Option<String>,
    timeout: Duration,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            gateway: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route OpenAI-compatible and Anthropic calls through
    /// `<gateway>/<provider>/v1/...` unless a model config sets its own endpoint.
    pub fn gateway(mut self, url: impl Into<String>) -> Self {
        self.gateway = Some(url.into()).filter(|u: &String| !u.trim().is_empty());
        self
    }

    /// Default timeout for [`Client::invoke`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fails only when the HTTP stack cannot initialize, e.g. no TLS backend.
    pub fn build(self) -> Result<Client> {
        // Every call stands alone; no idle connections are kept between calls.
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::config(format!("cannot build HTTP client: {e}")))?;

        Ok(Client {
            http,
            gateway: self.gateway,
            timeout: self.timeout,
        })
    }
}

/// Provider-agnostic LLM client.
///
/// Holds no per-call state: concurrent calls share nothing but the HTTP
/// client handle, and each owns its own deadline.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    gateway: Option<String>,
    timeout: Duration,
}

impl Client {
    /// A client with no gateway and the default timeout.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Invoke with the client's default timeout.
    pub async fn invoke(&self, request: &InvocationRequest) -> Result<Invocation> {
        self.invoke_with_timeout(request, self.timeout).await
    }

    /// Invoke with an explicit timeout, measured from call start.
    pub async fn invoke_with_timeout(
        &self,
        request: &InvocationRequest,
        timeout: Duration,
    ) -> Result<Invocation> {
        let config = &request.config;
        check_config(config)?;

        let encoder = encoder_for(config.provider.family());
        let prompt = Prompt::build(request, encoder);
        let target = Target {
            provider: config.provider,
            model: &config.model_id,
            api_key: &config.api_key,
            custom_endpoint: config.custom_endpoint(),
            gateway: self.gateway.as_deref(),
            tuning: config.tuning,
        };
        let wire = encoder.encode(&target, &prompt)?;

        debug!(
            provider = %config.provider,
            model = %config.model_id,
            history = request.history.len(),
            attachments = request.attachments.len(),
            "invoking model"
        );

        let started = Instant::now();
        let raw = match transport::send(&self.http, &wire, timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    provider = %config.provider,
                    model = %config.model_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "invocation failed"
                );
                return Err(e);
            }
        };
        let elapsed = started.elapsed();

        let normalized = from_decoded(encoder.decode(&raw), &wire.body);
        let cost = cost_of(
            &config.model_id,
            config.provider,
            &normalized.usage,
            config.costs.as_ref(),
            config.cost_per_call,
        );

        info!(
            provider = %config.provider,
            model = %config.model_id,
            incoming = normalized.usage.incoming_tokens,
            outgoing = normalized.usage.outgoing_tokens,
            estimated = normalized.usage.estimated,
            cost,
            elapsed_ms = elapsed.as_millis() as u64,
            "invocation complete"
        );

        Ok(Invocation {
            text: normalized.text,
            usage: normalized.usage,
            cost,
            model_id: config.model_id.clone(),
            provider: config.provider,
            elapsed,
        })
    }

    /// Send one prompt to several models at once.
    ///
    /// Results come back in input order, keyed by config id. Each call is
    /// independent: one failing or timing out does not affect the others.
    pub async fn arena(
        &self,
        configs: &[ModelConfig],
        prompt: &str,
    ) -> Vec<(String, Result<Invocation>)> {
        let calls = configs.iter().map(|config| async move {
            let request = InvocationRequest::new(config.clone(), prompt);
            (config.id.clone(), self.invoke(&request).await)
        });
        join_all(calls).await
    }
}

/// Preconditions checked before anything is sent.
fn check_config(config: &ModelConfig) -> Result<()> {
    if config.api_key.trim().is_empty() {
        return Err(Error::config(format!(
            "no API key configured for {}",
            config.name
        )));
    }
    if config.model_id.trim().is_empty() {
        return Err(Error::config(format!(
            "no model id configured for {}",
            config.name
        )));
    }
    let descriptor = config.provider.descriptor();
    if descriptor.requires_endpoint && config.custom_endpoint().is_none() {
        return Err(Error::config(format!(
            "{} requires a custom endpoint",
            descriptor.display_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_rejected() {
        let config = ModelConfig::new(ProviderId::OpenAi, "gpt-4o", "");
        assert!(check_config(&config).unwrap_err().is_configuration());
    }

    #[test]
    fn missing_model_is_rejected() {
        let config = ModelConfig::new(ProviderId::Google, " ", "key");
        assert!(check_config(&config).unwrap_err().is_configuration());
    }

    #[test]
    fn azure_needs_endpoint() {
        let config = ModelConfig::new(ProviderId::Azure, "gpt-4o", "key");
        assert!(check_config(&config).unwrap_err().is_configuration());

        let config = config.with_endpoint(
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01",
        );
        assert!(check_config(&config).is_ok());
    }

    #[test]
    fn builder_keeps_settings() {
        let client = Client::builder()
            .gateway("https://gw.example.com")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.gateway.as_deref(), Some("https://gw.example.com"));
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn blank_gateway_is_ignored() {
        let client = Client::builder().gateway("  ").build().unwrap();
        assert!(client.gateway.is_none());
    }

    #[tokio::test]
    async fn configuration_errors_skip_the_network() {
        // Unroutable endpoint: reaching the network would fail differently.
        let config = ModelConfig::new(ProviderId::OpenAi, "gpt-4o", "")
            .with_endpoint("http://192.0.2.1/v1/chat/completions");
        let err = Client::new()
            .unwrap()
            .invoke(&InvocationRequest::new(config, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
