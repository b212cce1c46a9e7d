//! Session tracking module.
//!
//! Transient per-username authentication state and per-connection
//! identity associations, live from the pre-login decision until the
//! player fully joins or the retention window after their disconnect
//! runs out. Backed by sharded concurrent maps so simultaneous
//! connection attempts for unrelated usernames never contend.

pub mod models;
pub mod reaper;
pub mod registry;

pub use models::SessionState;
pub use reaper::SessionReaper;
pub use registry::SessionRegistry;
