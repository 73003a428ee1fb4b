//! One row of the ledger.

use chrono::{DateTime, Utc};
use registry::ProviderId;
use runtime::Invocation;
use uuid::Uuid;

/// Outcome of a single invocation.
///
/// Token naming follows the runtime: `incoming` is what the model produced,
/// `outgoing` is what was sent to it.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub config_id: String,
    pub provider: ProviderId,
    pub model: String,
    pub incoming_tokens: u32,
    pub outgoing_tokens: u32,
    pub cost: f64,
    pub estimated: bool,
    /// Set for failed calls, which carry no usage or cost.
    pub error: Option<String>,
}

impl UsageRecord {
    pub fn success(config_id: impl Into<String>, invocation: &Invocation) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            config_id: config_id.into(),
            provider: invocation.provider,
            model: invocation.model_id.clone(),
            incoming_tokens: invocation.usage.incoming_tokens,
            outgoing_tokens: invocation.usage.outgoing_tokens,
            cost: invocation.cost,
            estimated: invocation.usage.estimated,
            error: None,
        }
    }

    pub fn failure(
        config_id: impl Into<String>,
        provider: ProviderId,
        model: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            config_id: config_id.into(),
            provider,
            model: model.into(),
            incoming_tokens: 0,
            outgoing_tokens: 0,
            cost: 0.0,
            estimated: false,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
