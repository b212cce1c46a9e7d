//! Session data models.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transient authentication state for one username.
///
/// One instance is live per case-folded username at a time. Created
/// lazily on first access, mutated by the gate and the login/disconnect
/// handlers, and evicted by the reaper once the player has been
/// disconnected longer than the retention window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Username, case-folded.
    pub username: String,

    /// Display name, set by the interactive auth surface.
    pub display_name: String,

    /// Whether the session passed authentication (premium proof or
    /// interactive login).
    pub authenticated: bool,

    /// Whether the player has fully logged in.
    pub logged_in: bool,

    /// Whether the session still needs interactive registration/login.
    pub need_auth: bool,

    /// Interactive auth attempt counter.
    pub auth_attempts: u32,

    /// Live connection id while connected.
    pub connection_id: Option<Uuid>,

    /// Creation time, unix millis.
    pub created_at_ms: i64,

    /// Last disconnect time, unix millis. 0 while connected; entries
    /// with a non-zero value are candidates for reaping.
    pub last_disconnect_ms: i64,

    /// Freeform auth context string for the interactive surface.
    pub auth_context: String,
}

impl SessionState {
    /// Default state for a freshly seen username: all flags false,
    /// connected (disconnect time 0).
    pub(crate) fn new(username: &str) -> Self {
        Self {
            username: username.to_lowercase(),
            display_name: String::new(),
            authenticated: false,
            logged_in: false,
            need_auth: false,
            auth_attempts: 0,
            connection_id: None,
            created_at_ms: Utc::now().timestamp_millis(),
            last_disconnect_ms: 0,
            auth_context: String::new(),
        }
    }

    /// Whether the session currently has a live connection.
    pub fn is_connected(&self) -> bool {
        self.last_disconnect_ms == 0
    }
}
