//! Switchboard runtime: one call shape for many LLM providers.
//!
//! A caller describes a call once, as an [`InvocationRequest`], and the
//! runtime turns it into the right wire format for the target provider.
//!
//! # Overview
//!
//! - **Prompt assembly**: system prompt, history and the current turn, with
//!   attached file text, tool results and de-duplicated images.
//! - **Wire encoders**: OpenAI-compatible chat completions, Google
//!   `generateContent` and Anthropic Messages, chosen by the provider's
//!   [`WireFamily`](registry::WireFamily).
//! - **Transport**: one HTTP POST per call under its own deadline.
//! - **Normalization**: text and token usage in a single shape, with a
//!   length-based estimate when the provider reports no usage.
//! - **Cost**: config override, registry pricing or a flat per-call fee.
//!
//! Every failure comes back as an [`Error`]; nothing panics across this API.
//!
//! # Example
//!
//! ```no_run
//! use registry::ProviderId;
//! use runtime::{Client, InvocationRequest, ModelConfig};
//!
//! # async fn example() -> runtime::Result<()> {
//! let config = ModelConfig::new(ProviderId::OpenAi, "gpt-4o-mini", "sk-...");
//! let client = Client::new()?;
//!
//! let request = InvocationRequest::new(config, "What is 2 + 2?").system("Be brief.");
//! let result = client.invoke(&request).await?;
//! println!("{} (${:.6})", result.text, result.cost);
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod cost;
mod error;
mod normalize;
mod prompt;
mod providers;
mod request;
mod transport;
mod validate;

pub use client::{Client, ClientBuilder, DEFAULT_TIMEOUT, Invocation};
pub use config::{CostOverride, ModelConfig, Tuning};
pub use cost::compute_cost;
pub use error::{Error, Result};
pub use normalize::{Normalized, Usage, estimate_tokens, normalize};
pub use prompt::ContentPart;
pub use request::{Attachment, ImageSource, InvocationRequest, Role, Turn};
pub use validate::Validation;

