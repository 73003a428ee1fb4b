//! Known per-model pricing.
//!
//! Prices are USD per million tokens and reflect published list prices.
//! They are informational: callers can override them per model config.

use crate::ProviderId;

/// Pricing and capacity metadata for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingEntry {
    pub model_id: &'static str,
    pub provider: ProviderId,
    /// Price per million prompt tokens.
    pub input_per_million: f64,
    /// Price per million completion tokens.
    pub output_per_million: f64,
    pub context_window: u32,
    /// Often usable at no or low cost. Informational only.
    pub free_tier: bool,
    pub note: &'static str,
    /// Set for models hosted by a third party rather than their author.
    pub available_via: Option<&'static str>,
}

macro_rules! price {
    ($model:literal, $provider:ident, $input:literal, $output:literal, $ctx:literal, $free:literal, $note:literal) => {
        price!($model, $provider, $input, $output, $ctx, $free, $note, None)
    };
    ($model:literal, $provider:ident, $input:literal, $output:literal, $ctx:literal, $free:literal, $note:literal, $via:expr) => {
        PricingEntry {
            model_id: $model,
            provider: ProviderId::$provider,
            input_per_million: $input,
            output_per_million: $output,
            context_window: $ctx,
            free_tier: $free,
            note: $note,
            available_via: $via,
        }
    };
}

static PRICING: &[PricingEntry] = &[
    // OpenAI
    price!("gpt-4o", OpenAi, 2.50, 10.00, 128_000, false, "Flagship multimodal model."),
    price!("gpt-4o-mini", OpenAi, 0.15, 0.60, 128_000, false, "Small, fast multimodal model."),
    price!("gpt-4-turbo", OpenAi, 10.00, 30.00, 128_000, false, "Previous-generation GPT-4."),
    price!("gpt-3.5-turbo", OpenAi, 0.50, 1.50, 16_385, false, "Legacy chat model."),
    price!("o1-mini", OpenAi, 3.00, 12.00, 128_000, false, "Reasoning model."),
    // Google
    price!("gemini-1.5-pro", Google, 1.25, 5.00, 2_000_000, true, "Free tier with rate limits."),
    price!("gemini-1.5-flash", Google, 0.075, 0.30, 1_000_000, true, "Free tier with rate limits."),
    price!("gemini-2.0-flash", Google, 0.10, 0.40, 1_000_000, true, "Free tier with rate limits."),
    // Anthropic
    price!("claude-3-5-sonnet-20241022", Anthropic, 3.00, 15.00, 200_000, false, "Balanced model."),
    price!("claude-3-5-haiku-20241022", Anthropic, 0.80, 4.00, 200_000, false, "Fast model."),
    price!("claude-3-opus-20240229", Anthropic, 15.00, 75.00, 200_000, false, "Largest Claude 3 model."),
    price!("claude-3-haiku-20240307", Anthropic, 0.25, 1.25, 200_000, false, "Cheapest Claude model."),
    // Perplexity
    price!("sonar", Perplexity, 1.00, 1.00, 127_000, false, "Plus a per-request search fee."),
    price!("sonar-pro", Perplexity, 3.00, 15.00, 200_000, false, "Plus a per-request search fee."),
    // Meta (third-party hosted)
    price!(
        "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
        Meta, 0.88, 0.88, 131_072, false, "Open weights.", Some("Together AI")
    ),
    price!(
        "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
        Meta, 0.18, 0.18, 131_072, true, "Open weights.", Some("Together AI")
    ),
    // xAI
    price!("grok-2-latest", Grok, 2.00, 10.00, 131_072, false, "Text model."),
    price!("grok-beta", Grok, 5.00, 15.00, 131_072, false, "Early access model."),
    // Qwen
    price!("qwen-max", Qwen, 1.60, 6.40, 32_768, false, "Largest hosted Qwen."),
    price!("qwen-plus", Qwen, 0.40, 1.20, 131_072, false, "Balanced Qwen."),
    price!("qwen-turbo", Qwen, 0.05, 0.20, 1_000_000, true, "Free quota for new accounts."),
    // DeepSeek
    price!("deepseek-chat", DeepSeek, 0.27, 1.10, 64_000, false, "DeepSeek-V3."),
    price!("deepseek-reasoner", DeepSeek, 0.55, 2.19, 64_000, false, "DeepSeek-R1."),
];

/// All known pricing entries.
pub fn pricing() -> &'static [PricingEntry] {
    PRICING
}

/// Pricing for a model id, if known.
pub fn lookup_pricing(model_id: &str) -> Option<&'static PricingEntry> {
    PRICING.iter().find(|p| p.model_id == model_id)
}

/// Pricing entries owned by one provider.
pub fn pricing_for_provider(provider: ProviderId) -> impl Iterator<Item = &'static PricingEntry> {
    PRICING.iter().filter(move |p| p.provider == provider)
}
