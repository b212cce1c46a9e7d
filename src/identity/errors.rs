//! Identity provider error types.

use thiserror::Error;

/// Errors a single provider lookup can fail with.
///
/// Every variant is transient from the resolver's point of view: the
/// chain logs it and fails over to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect timeout, read timeout, DNS, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a status that is neither a success nor
    /// one of its definitive-absence codes (rate limits and 5xx land here).
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The provider answered 200 but the body did not have the expected
    /// shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result type for provider lookups.
pub type ProviderResult<T> = Result<T, ProviderError>;
