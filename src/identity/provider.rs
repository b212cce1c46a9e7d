//! Identity provider endpoints.
//!
//! Each provider is an HTTP GET against a fixed base URL with the
//! username appended. Providers differ in how the canonical account id is
//! embedded in the response body and in which status codes mean "this
//! account definitively does not exist", so each one is described by a
//! [`ResponseShape`] plus a list of absence statuses rather than by its
//! own hand-written client code.

use super::errors::{ProviderError, ProviderResult};
use crate::config::GateConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// A single identity lookup endpoint.
///
/// Implemented by [`HttpProvider`] for the real endpoints and by fakes in
/// tests. The resolver only ever talks to this trait.
#[async_trait]
pub trait ProviderEndpoint: Send + Sync {
    /// Provider name used in failover diagnostics.
    fn name(&self) -> &str;

    /// Look up `username`.
    ///
    /// - `Ok(Some(id))` — the username maps to a verified account.
    /// - `Ok(None)` — the provider definitively confirmed the account
    ///   does not exist. The chain trusts this from any single provider.
    /// - `Err(_)` — transient failure; the chain fails over.
    async fn fetch(&self, username: &str) -> ProviderResult<Option<Uuid>>;
}

/// How a provider encodes the canonical id in a 200 response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A top-level string field holding the id (raw 32-hex or dashed).
    /// A missing or null field is a malformed response.
    IdField { field: &'static str },

    /// A top-level string field holding the id where an explicit null
    /// means the account does not exist (Minetools answers 200 with a
    /// null id for unknown names).
    NullableIdField { field: &'static str },

    /// PlayerDB envelope: a boolean `success` flag, with the id nested
    /// at `data.player.id`. `success: false` is a definitive absence.
    Envelope,
}

impl ResponseShape {
    /// Extract the canonical id from a 200 response body.
    pub fn extract(&self, body: &Value) -> ProviderResult<Option<Uuid>> {
        match self {
            ResponseShape::IdField { field } => match body.get(field) {
                Some(Value::String(id)) => parse_canonical_id(id).map(Some),
                _ => Err(ProviderError::Malformed(format!(
                    "missing or non-string `{field}` field"
                ))),
            },
            ResponseShape::NullableIdField { field } => match body.get(field) {
                Some(Value::String(id)) => parse_canonical_id(id).map(Some),
                Some(Value::Null) | None => Ok(None),
                _ => Err(ProviderError::Malformed(format!(
                    "non-string `{field}` field"
                ))),
            },
            ResponseShape::Envelope => {
                let success = body
                    .get("success")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| ProviderError::Malformed("missing `success` flag".into()))?;
                if !success {
                    return Ok(None);
                }
                let id = body
                    .pointer("/data/player/id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ProviderError::Malformed("missing `data.player.id` field".into())
                    })?;
                parse_canonical_id(id).map(Some)
            }
        }
    }
}

/// Parse a provider-supplied id in either textual layout (raw 32-hex or
/// hyphenated) into the one canonical dashed form.
pub fn parse_canonical_id(id: &str) -> ProviderResult<Uuid> {
    Uuid::parse_str(id).map_err(|e| ProviderError::Malformed(format!("bad account id {id:?}: {e}")))
}

/// An HTTP identity provider described by data: name, base URL, response
/// shape and definitive-absence status codes.
pub struct HttpProvider {
    name: &'static str,
    base_url: &'static str,
    shape: ResponseShape,
    absent_statuses: &'static [u16],
    client: Client,
}

impl HttpProvider {
    pub fn new(
        name: &'static str,
        base_url: &'static str,
        shape: ResponseShape,
        absent_statuses: &'static [u16],
        client: Client,
    ) -> Self {
        Self {
            name,
            base_url,
            shape,
            absent_statuses,
            client,
        }
    }
}

#[async_trait]
impl ProviderEndpoint for HttpProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, username: &str) -> ProviderResult<Option<Uuid>> {
        let url = format!("{}{}", self.base_url, username);
        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();

        if self.absent_statuses.contains(&status) {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ProviderError::UnexpectedStatus(status));
        }

        let body: Value = response.json().await?;
        self.shape.extract(&body)
    }
}

/// The production provider chain, ordered by authority: Mojang is the
/// official source, the rest are mirrors used as fallbacks.
///
/// All four share one HTTP client with the configured connect and total
/// timeouts.
pub fn default_chain(config: &GateConfig) -> ProviderResult<Vec<Arc<dyn ProviderEndpoint>>> {
    let client = Client::builder()
        .connect_timeout(Duration::from_millis(config.provider_connect_timeout_ms))
        .timeout(Duration::from_millis(config.provider_read_timeout_ms))
        .user_agent(concat!("auth_gate/", env!("CARGO_PKG_VERSION")))
        .build()?;

    Ok(vec![
        Arc::new(HttpProvider::new(
            "Mojang",
            "https://api.mojang.com/users/profiles/minecraft/",
            ResponseShape::IdField { field: "id" },
            &[404, 204],
            client.clone(),
        )),
        Arc::new(HttpProvider::new(
            "Ashcon",
            "https://api.ashcon.app/mojang/v2/user/",
            ResponseShape::IdField { field: "uuid" },
            &[404],
            client.clone(),
        )),
        Arc::new(HttpProvider::new(
            "PlayerDB",
            "https://playerdb.co/api/player/minecraft/",
            ResponseShape::Envelope,
            &[400, 404],
            client.clone(),
        )),
        Arc::new(HttpProvider::new(
            "Minetools",
            "https://api.minetools.eu/uuid/",
            ResponseShape::NullableIdField { field: "id" },
            &[404],
            client,
        )),
    ])
}
