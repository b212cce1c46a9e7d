//! Identity resolver with ordered provider failover.

use super::provider::ProviderEndpoint;
use crate::config::GateConfig;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Outcome of resolving a username against the identity provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A provider confirmed the username maps to a verified account with
    /// this canonical id.
    Verified(Uuid),

    /// A provider definitively confirmed the username has no verified
    /// account.
    NotVerified,

    /// Every provider failed before producing a definitive answer.
    /// Callers must fail open to the unverified path.
    Indeterminate,
}

/// The resolver seam the connection gate depends on.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve whether `username` belongs to a verified account.
    ///
    /// Never fails: provider outages degrade to
    /// [`Resolution::Indeterminate`].
    async fn resolve(&self, username: &str) -> Resolution;
}

/// Resolver backed by an ordered list of provider endpoints.
///
/// Providers are consulted in priority order. A definitive answer from
/// any provider — exists or does not exist — ends the chain immediately;
/// providers share a public namespace, so a confirmed absence is trusted
/// from a single source. Failures log and fall through to the next
/// provider.
pub struct ProviderChain {
    providers: Vec<Arc<dyn ProviderEndpoint>>,
}

impl ProviderChain {
    /// Create a chain from an explicit, priority-ordered provider list.
    pub fn new(providers: Vec<Arc<dyn ProviderEndpoint>>) -> Self {
        Self { providers }
    }

    /// Create a chain with the four production providers.
    pub fn with_default_providers(
        config: &GateConfig,
    ) -> super::errors::ProviderResult<Self> {
        Ok(Self::new(super::provider::default_chain(config)?))
    }
}

#[async_trait]
impl IdentityResolver for ProviderChain {
    async fn resolve(&self, username: &str) -> Resolution {
        for provider in &self.providers {
            match provider.fetch(username).await {
                Ok(Some(id)) => {
                    log::debug!(
                        "Provider {} resolved {} to verified account {}",
                        provider.name(),
                        username,
                        id
                    );
                    return Resolution::Verified(id);
                }
                Ok(None) => {
                    log::debug!(
                        "Provider {} confirmed {} has no verified account",
                        provider.name(),
                        username
                    );
                    return Resolution::NotVerified;
                }
                Err(e) => {
                    log::warn!(
                        "Provider {} failed for {}: {}, failing over to next provider",
                        provider.name(),
                        username,
                        e
                    );
                }
            }
        }

        log::error!(
            "All identity providers failed for {}, resolution is indeterminate",
            username
        );
        Resolution::Indeterminate
    }
}
