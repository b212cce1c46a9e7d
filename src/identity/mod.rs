//! Identity resolution module.
//!
//! Answers one question: does a username currently map to a verified
//! central account, and if so, what is its canonical id? The answer comes
//! from a prioritized chain of HTTP providers with failover:
//!
//! - A definitive "exists" or "does not exist" from any provider ends the
//!   chain immediately.
//! - Timeouts, rate limits, server errors and malformed bodies fall
//!   through to the next provider.
//! - If every provider fails, the result is [`Resolution::Indeterminate`]
//!   and callers fail open to the unverified path.
//!
//! Lookups are bounded by short per-provider timeouts (2.5 s connect and
//! read by default) so a dead provider cannot stall the proxy.

pub mod errors;
pub mod provider;
pub mod resolver;

pub use errors::{ProviderError, ProviderResult};
pub use provider::{HttpProvider, ProviderEndpoint, ResponseShape, default_chain, parse_canonical_id};
pub use resolver::{IdentityResolver, ProviderChain, Resolution};
