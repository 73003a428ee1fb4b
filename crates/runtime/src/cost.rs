//! Monetary cost of a call.

use crate::config::CostOverride;
use crate::normalize::Usage;
use registry::ProviderId;
use tracing::debug;

const PER_MILLION: f64 = 1_000_000.0;

/// Cost of one call in currency units (not cents).
///
/// Precedence: config override with both rates, then registry pricing for
/// `model_id`, then the flat per-call cost, then zero.
///
/// `outgoing_tokens` (sent to the provider) are priced at the input rate and
/// `incoming_tokens` (received) at the output rate.
pub fn compute_cost(
    model_id: &str,
    provider: ProviderId,
    incoming_tokens: u32,
    outgoing_tokens: u32,
    override_costs: Option<&CostOverride>,
    cost_per_call: Option<f64>,
) -> f64 {
    let rates = override_costs
        .and_then(CostOverride::rates)
        .map(|rates| ("override", rates))
        .or_else(|| {
            registry::lookup_pricing(model_id)
                .map(|p| ("registry", (p.input_per_million, p.output_per_million)))
        });

    match rates {
        Some((source, (input_rate, output_rate))) => {
            debug!(%provider, model = model_id, source, "pricing by tokens");
            f64::from(outgoing_tokens) / PER_MILLION * input_rate
                + f64::from(incoming_tokens) / PER_MILLION * output_rate
        }
        None => cost_per_call.unwrap_or(0.0),
    }
}

/// [`compute_cost`] for a [`Usage`].
pub(crate) fn cost_of(
    model_id: &str,
    provider: ProviderId,
    usage: &Usage,
    override_costs: Option<&CostOverride>,
    cost_per_call: Option<f64>,
) -> f64 {
    compute_cost(
        model_id,
        provider,
        usage.incoming_tokens,
        usage.outgoing_tokens,
        override_costs,
        cost_per_call,
    )
}
