//! # Auth Gate
//!
//! Connection gating and premium identity verification for multiplayer
//! game proxies.
//!
//! The crate decides, per connecting username, whether a session must be
//! cryptographically verified against a central identity provider
//! ("premium/online mode") or accepted unverified ("cracked/offline
//! mode"), and tracks short-lived per-connection authentication state
//! until the player fully joins or disconnects.
//!
//! ## Architecture
//!
//! - [`identity`]: prioritized chain of HTTP identity providers with
//!   failover, short timeouts, and fail-open semantics.
//! - [`gate`]: the per-connection decision engine, including the
//!   double-join heuristic that spares the providers a second query when
//!   a just-rejected client instantly reconnects.
//! - [`session`]: concurrent registry of transient session state plus
//!   the periodic reaper that evicts stale entries.
//! - [`store`]: the persistent player store boundary (trait plus an
//!   in-memory reference implementation).
//! - [`config`]: every window and timeout in one tunable struct.
//!
//! This is a library invoked by a host proxy: the host delivers the
//! pre-login, login and disconnect callbacks and owns the transport.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth_gate::{
//!     ConnectionGate, GateConfig, MemoryPlayerStore, ProviderChain, SessionReaper,
//!     SessionRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GateConfig::from_env();
//!     let store = Arc::new(MemoryPlayerStore::new());
//!     let resolver = Arc::new(ProviderChain::with_default_providers(&config)?);
//!     let sessions = Arc::new(SessionRegistry::new());
//!     let gate = ConnectionGate::new(store, resolver, sessions.clone(), config.clone());
//!     let reaper = SessionReaper::spawn(sessions, &config);
//!
//!     let decision = gate.decide_pre_login("Notch").await;
//!     println!("pre-login decision: {decision:?}");
//!
//!     reaper.abort();
//!     Ok(())
//! }
//! ```

/// Gate and reaper configuration.
pub mod config;
pub use config::GateConfig;

/// Connection-phase decision engine.
pub mod gate;
pub use gate::{ConnectionGate, LoginOutcome, PendingVerificationCache, PreLoginDecision};

/// Identity provider chain and resolver.
pub mod identity;
pub use identity::{
    HttpProvider, IdentityResolver, ProviderChain, ProviderEndpoint, ProviderError, Resolution,
    ResponseShape,
};

/// Transient session state tracking.
pub mod session;
pub use session::{SessionReaper, SessionRegistry, SessionState};

/// Persistent player store boundary.
pub mod store;
pub use store::{MemoryPlayerStore, PlayerRecord, PlayerStore, StoreError, StoreResult};
