//! Pending verification cache.

use chrono::Utc;
use dashmap::DashMap;

/// Time-windowed record of usernames currently mid-verification.
///
/// An entry means a verified-mode check was dispatched for the username
/// and has not been resolved yet, or has been resolved but is
/// deliberately retained: entries survive disconnects so that a client
/// that just failed the cryptographic challenge and instantly reconnects
/// is recognized as a double join.
///
/// Entries leave the cache exactly two ways: consumed by
/// [`take_if_fresh`] when the same username reconnects inside the
/// window, or cleared by the login-finalization path when the
/// verification actually succeeded. A stale entry simply sits until the
/// next verified-mode probe overwrites it.
///
/// [`take_if_fresh`]: PendingVerificationCache::take_if_fresh
pub struct PendingVerificationCache {
    /// Case-folded username -> attempt-start time, unix millis.
    entries: DashMap<String, i64>,
    window_ms: i64,
}

impl PendingVerificationCache {
    /// Create a cache with the given double-join window.
    pub fn new(window_ms: i64) -> Self {
        Self {
            entries: DashMap::new(),
            window_ms,
        }
    }

    /// Record that a verified-mode check was just dispatched for this
    /// username, overwriting any stale entry.
    pub fn begin(&self, username: &str) {
        self.entries
            .insert(username.to_lowercase(), Utc::now().timestamp_millis());
    }

    /// Atomically remove and return the entry for this username if it is
    /// younger than the window. A stale entry is left in place; the
    /// caller falls through to a fresh resolution.
    pub fn take_if_fresh(&self, username: &str) -> Option<i64> {
        let now = Utc::now().timestamp_millis();
        self.entries
            .remove_if(&username.to_lowercase(), |_, started| {
                now - *started < self.window_ms
            })
            .map(|(_, started)| started)
    }

    /// Remove the entry unconditionally (finalization path).
    pub fn clear(&self, username: &str) -> Option<i64> {
        self.entries
            .remove(&username.to_lowercase())
            .map(|(_, started)| started)
    }

    /// Whether an entry exists for this username, fresh or stale.
    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(&username.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
