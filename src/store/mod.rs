//! Player store boundary.
//!
//! Persistent account storage is an external collaborator: this module
//! defines only the record shape and the [`PlayerStore`] trait the gate
//! talks to, plus an in-memory reference implementation for tests and
//! embeddable hosts. Which engine actually backs the trait is the host's
//! business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryPlayerStore;

/// Player store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing engine failed. The message is backend-specific.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for player store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted account record, keyed by canonical id with a unique
/// case-folded username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Canonical account id.
    pub id: Uuid,

    /// Username, stored case-folded.
    pub username: String,

    /// Password hash placeholder; premium records never set one.
    pub password_hash: String,

    /// Last network address the account connected from.
    pub last_address: String,

    /// Last time the account was seen.
    pub last_seen: DateTime<Utc>,

    /// Freeform auth secret, unused by the gate itself.
    pub auth_secret: String,

    /// Whether the account is a verified (premium) one.
    pub is_premium: bool,
}

impl PlayerRecord {
    /// Build a first-join premium record from a transport-verified id.
    ///
    /// The hash and secret fields get the `"none"` placeholder; premium
    /// accounts authenticate cryptographically, never by password.
    pub fn premium(id: Uuid, username: &str, remote_addr: IpAddr) -> Self {
        Self {
            id,
            username: username.to_lowercase(),
            password_hash: "none".to_string(),
            last_address: remote_addr.to_string(),
            last_seen: Utc::now(),
            auth_secret: "none".to_string(),
            is_premium: true,
        }
    }
}

/// Trait for persistent player record storage.
///
/// Implementations must uphold: exactly one record per canonical id,
/// usernames unique and case-folded, last-write-wins on [`upsert`].
///
/// [`upsert`]: PlayerStore::upsert
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Find a record by case-folded username.
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<PlayerRecord>>;

    /// Find a record by canonical id.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<PlayerRecord>>;

    /// Insert or replace a record, last-write-wins.
    async fn upsert(&self, record: PlayerRecord) -> StoreResult<()>;

    /// Delete the record with this canonical id, if any.
    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    /// List stored usernames starting with `prefix`, for interactive
    /// suggestion surfaces.
    async fn usernames_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}
