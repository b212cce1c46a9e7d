//! Connection gate implementation.

use super::pending::PendingVerificationCache;
use crate::config::GateConfig;
use crate::identity::{IdentityResolver, Resolution};
use crate::session::SessionRegistry;
use crate::store::{PlayerRecord, PlayerStore};
use std::net::IpAddr;
use std::sync::Arc;
use uuid::Uuid;

/// Connection mode forced at the pre-login phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreLoginDecision {
    /// The transport must demand cryptographic proof of account
    /// ownership before letting the connection proceed.
    ForceVerified,

    /// The claimed username is accepted without proof.
    ForceUnverified,
}

/// Outcome of the login-finalization phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// First join of a genuine premium account: a new record was
    /// persisted and the session is fully authenticated.
    RegisteredPremium,

    /// Returning premium player: authenticated without any write.
    PremiumBypass,

    /// Unverified session: interactive registration/login is still
    /// required through the host's command surface.
    NeedsAuth,
}

/// The decision engine invoked at each connection phase.
///
/// Holds handles to its collaborators (player store, identity resolver,
/// session registry) plus the gate-owned pending-verification cache.
/// Cheap to clone; all state lives behind the shared handles.
///
/// # Latency
///
/// `decide_pre_login` is awaited by the connecting client and may run
/// the full resolver chain; worst case is the sum of all per-provider
/// timeouts. Hosts must call it off the transport's accept loop so a
/// slow decision never stalls unrelated connections.
#[derive(Clone)]
pub struct ConnectionGate {
    store: Arc<dyn PlayerStore>,
    resolver: Arc<dyn IdentityResolver>,
    sessions: Arc<SessionRegistry>,
    pending: Arc<PendingVerificationCache>,
}

impl ConnectionGate {
    /// Create a gate wired to its collaborators.
    ///
    /// The pending-verification cache is owned by the gate and sized by
    /// `config.double_join_window_ms`.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistent player record storage
    /// * `resolver` - Identity resolver consulted for unregistered names
    /// * `sessions` - Shared session registry
    /// * `config` - Gate tunables
    ///
    /// # Returns
    ///
    /// * `ConnectionGate` - Gate ready to serve the connection callbacks
    pub fn new(
        store: Arc<dyn PlayerStore>,
        resolver: Arc<dyn IdentityResolver>,
        sessions: Arc<SessionRegistry>,
        config: GateConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            sessions,
            pending: Arc::new(PendingVerificationCache::new(config.double_join_window_ms)),
        }
    }

    /// The gate-owned pending-verification cache.
    pub fn pending(&self) -> &PendingVerificationCache {
        &self.pending
    }

    /// Decide the connection mode for an inbound connection, before any
    /// authentication has happened.
    ///
    /// Decision order:
    /// 1. A stored record is terminal: its premium flag decides.
    /// 2. A fresh pending entry means this is the double join after a
    ///    failed verified-mode challenge: consume it and let the client
    ///    in unverified without re-querying the providers.
    /// 3. Otherwise resolve the username against the provider chain;
    ///    only a definitive `Verified` forces verified mode (and records
    ///    the pending attempt). Everything else fails open.
    ///
    /// # Arguments
    ///
    /// * `username` - Claimed username; case-folded internally
    ///
    /// # Returns
    ///
    /// * `PreLoginDecision` - Mode the transport must force for this
    ///   connection
    pub async fn decide_pre_login(&self, username: &str) -> PreLoginDecision {
        let username = username.to_lowercase();

        match self.store.find_by_username(&username).await {
            Ok(Some(record)) => {
                return if record.is_premium {
                    log::info!("{} is registered premium, forcing verified mode", username);
                    PreLoginDecision::ForceVerified
                } else {
                    log::info!("{} is registered unverified, forcing unverified mode", username);
                    PreLoginDecision::ForceUnverified
                };
            }
            Ok(None) => {}
            Err(e) => {
                // Fail open: an unreachable store must not block joins. A
                // genuinely premium name still gets verified mode below.
                log::error!("Player store lookup failed for {}: {}", username, e);
            }
        }

        if self.pending.take_if_fresh(&username).is_some() {
            log::info!(
                "{} failed a verified-mode check moments ago, letting in unverified",
                username
            );
            return PreLoginDecision::ForceUnverified;
        }

        match self.resolver.resolve(&username).await {
            Resolution::Verified(id) => {
                self.pending.begin(&username);
                log::info!(
                    "{} maps to verified account {}, forcing verified mode to test the client",
                    username,
                    id
                );
                PreLoginDecision::ForceVerified
            }
            Resolution::NotVerified => {
                log::info!("{} has no verified account, forcing unverified mode", username);
                PreLoginDecision::ForceUnverified
            }
            Resolution::Indeterminate => {
                log::warn!(
                    "Identity resolution inconclusive for {}, failing open to unverified mode",
                    username
                );
                PreLoginDecision::ForceUnverified
            }
        }
    }

    /// Finalize a connection that passed whatever mode was forced.
    ///
    /// `verified_id` is the transport-supplied canonical id for this
    /// connection; when the transport performed cryptographic
    /// verification it is authoritative, including over any id an
    /// earlier resolution produced.
    ///
    /// A pending entry still present here proves the transport completed
    /// the verified-mode proof (a failing client would have been
    /// disconnected before this phase): the account is registered as
    /// premium on the spot. A persistence failure is logged and the
    /// session keeps its in-memory verified flags; it never revokes the
    /// already-granted session.
    ///
    /// # Arguments
    ///
    /// * `username` - Username that completed the forced mode
    /// * `verified_id` - Transport-supplied canonical id for this
    ///   connection
    /// * `remote_addr` - Remote network address of the connection
    ///
    /// # Returns
    ///
    /// * `LoginOutcome` - How the session was settled
    pub async fn finalize_login(
        &self,
        username: &str,
        verified_id: Uuid,
        remote_addr: IpAddr,
    ) -> LoginOutcome {
        let username = username.to_lowercase();

        if self.pending.clear(&username).is_some() {
            let record = PlayerRecord::premium(verified_id, &username, remote_addr);
            if let Err(e) = self.store.upsert(record.clone()).await {
                log::error!("Failed to persist premium record for {}: {}", username, e);
            }
            self.sessions.attach_identity(verified_id, record);
            self.mark_verified(&username, verified_id);
            log::info!("{} verified as premium on first join", username);
            return LoginOutcome::RegisteredPremium;
        }

        let record = match self.store.find_by_username(&username).await {
            Ok(record) => record,
            Err(e) => {
                log::error!("Player store lookup failed for {}: {}", username, e);
                None
            }
        };

        match record {
            Some(record) if record.is_premium => {
                self.sessions.attach_identity(verified_id, record);
                self.mark_verified(&username, verified_id);
                log::info!("{} is premium and bypassed interactive auth", username);
                LoginOutcome::PremiumBypass
            }
            _ => {
                self.sessions.update(&username, |session| {
                    session.authenticated = false;
                    session.logged_in = false;
                    session.need_auth = true;
                    session.connection_id = Some(verified_id);
                });
                log::info!("{} is unverified or new, interactive auth required", username);
                LoginOutcome::NeedsAuth
            }
        }
    }

    /// Record a disconnect: drop the identity association and stamp the
    /// session's disconnect time.
    ///
    /// The pending-verification cache is deliberately left untouched: a
    /// client that just failed the verified-mode challenge reconnects
    /// within the window and must be recognized as a double join.
    ///
    /// # Arguments
    ///
    /// * `connection_id` - Id of the connection that closed
    /// * `username` - Username behind the connection; case-folded
    ///   internally
    pub fn handle_disconnect(&self, connection_id: Uuid, username: &str) {
        let username = username.to_lowercase();
        self.sessions.detach_identity(connection_id);
        self.sessions.mark_disconnected(&username);
        log::info!("{} disconnected", username);
    }

    fn mark_verified(&self, username: &str, connection_id: Uuid) {
        self.sessions.update(username, |session| {
            session.authenticated = true;
            session.logged_in = true;
            session.need_auth = false;
            session.connection_id = Some(connection_id);
        });
    }
}
