//! Concurrent session registry.

use super::models::SessionState;
use crate::store::PlayerRecord;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

/// Process-wide registry of transient session state.
///
/// Holds two maps: per-username [`SessionState`] and per-connection-id
/// [`PlayerRecord`] snapshots for players with an established identity.
/// Both are sharded concurrent maps, so connection attempts for
/// unrelated usernames never contend, and the entry-based operations
/// (`get_or_create`, `update`) are atomic per key — two simultaneous
/// attempts for the same username cannot race into divergent state.
///
/// Constructed once at startup and shared by handle with the gate and
/// the reaper.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionState>,
    identities: DashMap<Uuid, PlayerRecord>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the session for this username, creating the default one
    /// atomically if none exists. Returns a snapshot.
    pub fn get_or_create(&self, username: &str) -> SessionState {
        self.sessions
            .entry(username.to_lowercase())
            .or_insert_with(|| SessionState::new(username))
            .clone()
    }

    /// Snapshot of the session for this username, if any.
    pub fn get(&self, username: &str) -> Option<SessionState> {
        self.sessions
            .get(&username.to_lowercase())
            .map(|entry| entry.value().clone())
    }

    /// Mutate the session for this username under its shard lock,
    /// creating the default session first if none exists.
    pub fn update<T>(&self, username: &str, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut entry = self
            .sessions
            .entry(username.to_lowercase())
            .or_insert_with(|| SessionState::new(username));
        f(entry.value_mut())
    }

    /// Stamp the disconnect time and drop the live connection handle.
    /// The session itself stays until the reaper's retention window
    /// expires, so a quick rejoin resumes cleanly.
    pub fn mark_disconnected(&self, username: &str) {
        let now = Utc::now().timestamp_millis();
        self.update(username, |session| {
            session.last_disconnect_ms = now;
            session.connection_id = None;
        });
    }

    /// Drop the session for this username entirely.
    pub fn remove_session(&self, username: &str) -> Option<SessionState> {
        self.sessions
            .remove(&username.to_lowercase())
            .map(|(_, session)| session)
    }

    /// Associate an authenticated player record with a live connection id.
    pub fn attach_identity(&self, connection_id: Uuid, record: PlayerRecord) {
        self.identities.insert(connection_id, record);
    }

    /// Look up the authenticated player behind a live connection id.
    pub fn identity(&self, connection_id: Uuid) -> Option<PlayerRecord> {
        self.identities
            .get(&connection_id)
            .map(|entry| entry.value().clone())
    }

    /// Drop the identity association for a connection id on disconnect.
    pub fn detach_identity(&self, connection_id: Uuid) -> Option<PlayerRecord> {
        self.identities.remove(&connection_id).map(|(_, record)| record)
    }

    /// Evict sessions that have been disconnected longer than
    /// `retention_ms`. Connected sessions (disconnect time 0) are never
    /// evicted. Returns the number of evicted sessions.
    pub fn reap_expired(&self, retention_ms: i64) -> usize {
        let now = Utc::now().timestamp_millis();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| {
            session.last_disconnect_ms == 0 || now - session.last_disconnect_ms <= retention_ms
        });
        before - self.sessions.len()
    }

    /// Number of tracked sessions (any state).
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of live identity associations.
    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }
}
