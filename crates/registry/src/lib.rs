//! Static provider and pricing tables.
//!
//! Core principle: **the set of providers is closed.** Every supported
//! provider is a [`ProviderId`] variant, and every variant maps to exactly
//! one [`WireFamily`]. Adding a provider means extending the enum and the
//! tables here; the compiler then points at every match that needs a new arm.
//!
//! All lookups are pure. Absence is represented as `None`, never as an error.

mod error;
mod pricing;
mod provider;

pub use error::{Error, Result};
pub use pricing::{PricingEntry, lookup_pricing, pricing, pricing_for_provider};
pub use provider::{ProviderDescriptor, ProviderId, WireFamily, lookup_provider, providers};
