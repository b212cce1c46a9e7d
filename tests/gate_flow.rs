//! Integration tests for the connection gate.
//!
//! Exercises the full pre-login / finalize / disconnect flow against the
//! in-memory store and scripted resolvers. Time-windowed behavior is
//! driven by configuring the windows (0 for "always stale", the default
//! 15 s for "fresh") rather than by sleeping.

use async_trait::async_trait;
use auth_gate::{
    ConnectionGate, GateConfig, IdentityResolver, LoginOutcome, MemoryPlayerStore, PlayerRecord,
    PlayerStore, PreLoginDecision, Resolution, SessionRegistry, StoreError, StoreResult,
};
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Resolver returning a fixed resolution and counting invocations.
struct CountingResolver {
    resolution: Resolution,
    calls: AtomicUsize,
}

impl CountingResolver {
    fn new(resolution: Resolution) -> Arc<Self> {
        Arc::new(Self {
            resolution,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for CountingResolver {
    async fn resolve(&self, _username: &str) -> Resolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.resolution
    }
}

/// Store whose writes always fail; reads see nothing.
struct FailingStore;

#[async_trait]
impl PlayerStore for FailingStore {
    async fn find_by_username(&self, _username: &str) -> StoreResult<Option<PlayerRecord>> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<PlayerRecord>> {
        Ok(None)
    }

    async fn upsert(&self, _record: PlayerRecord) -> StoreResult<()> {
        Err(StoreError::Backend("write refused".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> StoreResult<()> {
        Ok(())
    }

    async fn usernames_with_prefix(&self, _prefix: &str) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Store whose reads and writes all fail, as if the backend were down.
struct UnreachableStore;

#[async_trait]
impl PlayerStore for UnreachableStore {
    async fn find_by_username(&self, _username: &str) -> StoreResult<Option<PlayerRecord>> {
        Err(StoreError::Backend("backend unreachable".to_string()))
    }

    async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<PlayerRecord>> {
        Err(StoreError::Backend("backend unreachable".to_string()))
    }

    async fn upsert(&self, _record: PlayerRecord) -> StoreResult<()> {
        Err(StoreError::Backend("backend unreachable".to_string()))
    }

    async fn delete(&self, _id: Uuid) -> StoreResult<()> {
        Err(StoreError::Backend("backend unreachable".to_string()))
    }

    async fn usernames_with_prefix(&self, _prefix: &str) -> StoreResult<Vec<String>> {
        Err(StoreError::Backend("backend unreachable".to_string()))
    }
}

fn verified_id() -> Uuid {
    "069a79f4-44e9-4726-a5be-fca90e38aaf5".parse().expect("valid uuid")
}

fn remote_addr() -> IpAddr {
    "203.0.113.7".parse().expect("valid address")
}

fn gate_with(
    store: Arc<dyn PlayerStore>,
    resolver: Arc<dyn IdentityResolver>,
    config: GateConfig,
) -> (ConnectionGate, Arc<SessionRegistry>) {
    let sessions = Arc::new(SessionRegistry::new());
    let gate = ConnectionGate::new(store, resolver, sessions.clone(), config);
    (gate, sessions)
}

async fn store_with_record(username: &str, premium: bool) -> Arc<MemoryPlayerStore> {
    let store = Arc::new(MemoryPlayerStore::new());
    let mut record = PlayerRecord::premium(Uuid::new_v4(), username, remote_addr());
    record.is_premium = premium;
    store.upsert(record).await.expect("seed record");
    store
}

// =========================================================================
// decide_pre_login
// =========================================================================

#[tokio::test]
async fn test_premium_record_always_forces_verified() {
    let store = store_with_record("alice", true).await;
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, _) = gate_with(store, resolver.clone(), GateConfig::default());
    // Cache state must be irrelevant for registered names.
    gate.pending().begin("alice");

    let decision = gate.decide_pre_login("alice").await;

    assert_eq!(decision, PreLoginDecision::ForceVerified);
    assert_eq!(resolver.calls(), 0, "registered names never hit the resolver");
}

#[tokio::test]
async fn test_cracked_record_always_forces_unverified() {
    let store = store_with_record("bob", false).await;
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, _) = gate_with(store, resolver.clone(), GateConfig::default());

    let decision = gate.decide_pre_login("bob").await;

    assert_eq!(decision, PreLoginDecision::ForceUnverified);
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn test_record_lookup_folds_username_case() {
    let store = store_with_record("alice", true).await;
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, _) = gate_with(store, resolver, GateConfig::default());

    let decision = gate.decide_pre_login("AlIcE").await;

    assert_eq!(decision, PreLoginDecision::ForceVerified);
}

#[tokio::test]
async fn test_double_join_skips_second_resolution() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, _) = gate_with(store, resolver.clone(), GateConfig::default());

    let first = gate.decide_pre_login("alice").await;
    assert_eq!(first, PreLoginDecision::ForceVerified);
    assert!(gate.pending().contains("alice"));

    // The client failed the challenge, got disconnected by the transport
    // and instantly reconnected.
    let second = gate.decide_pre_login("alice").await;

    assert_eq!(second, PreLoginDecision::ForceUnverified);
    assert_eq!(resolver.calls(), 1, "the double join must not re-query the providers");
    assert!(!gate.pending().contains("alice"), "the double join consumes the entry");
}

#[tokio::test]
async fn test_stale_pending_entry_triggers_fresh_resolution() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    // Window 0: every pending entry is stale immediately.
    let config = GateConfig {
        double_join_window_ms: 0,
        ..GateConfig::default()
    };
    let (gate, _) = gate_with(store, resolver.clone(), config);

    let first = gate.decide_pre_login("alice").await;
    let second = gate.decide_pre_login("alice").await;

    assert_eq!(first, PreLoginDecision::ForceVerified);
    assert_eq!(second, PreLoginDecision::ForceVerified);
    assert_eq!(resolver.calls(), 2, "a stale entry must not shortcut resolution");
}

#[tokio::test]
async fn test_not_verified_forces_unverified() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, _) = gate_with(store, resolver, GateConfig::default());

    let decision = gate.decide_pre_login("ghost_name").await;

    assert_eq!(decision, PreLoginDecision::ForceUnverified);
    assert!(gate.pending().is_empty(), "no pending entry for unverified names");
}

#[tokio::test]
async fn test_store_read_failure_still_consults_resolver() {
    // An unreachable store is treated as "no record": the decision
    // falls through to the resolver, so a genuinely premium name still
    // gets verified mode.
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, _) = gate_with(Arc::new(UnreachableStore), resolver.clone(), GateConfig::default());

    let decision = gate.decide_pre_login("alice").await;

    assert_eq!(decision, PreLoginDecision::ForceVerified);
    assert_eq!(resolver.calls(), 1, "a store failure must not skip resolution");
    assert!(gate.pending().contains("alice"));
}

#[tokio::test]
async fn test_store_read_failure_with_unverified_name_fails_open() {
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, _) = gate_with(Arc::new(UnreachableStore), resolver.clone(), GateConfig::default());

    let decision = gate.decide_pre_login("ghost_name").await;

    assert_eq!(decision, PreLoginDecision::ForceUnverified);
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_indeterminate_resolution_fails_open() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Indeterminate);
    let (gate, _) = gate_with(store, resolver, GateConfig::default());

    let decision = gate.decide_pre_login("alice").await;

    assert_eq!(decision, PreLoginDecision::ForceUnverified);
    assert!(gate.pending().is_empty());
}

// =========================================================================
// finalize_login
// =========================================================================

#[tokio::test]
async fn test_finalize_first_join_registers_premium() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, sessions) = gate_with(store.clone(), resolver, GateConfig::default());

    let decision = gate.decide_pre_login("alice").await;
    assert_eq!(decision, PreLoginDecision::ForceVerified);

    // The transport completed the cryptographic challenge and the
    // connection reached the login phase.
    let outcome = gate.finalize_login("alice", verified_id(), remote_addr()).await;

    assert_eq!(outcome, LoginOutcome::RegisteredPremium);
    assert!(!gate.pending().contains("alice"), "finalization clears the pending entry");
    assert_eq!(store.len().await, 1, "exactly one new record");

    let record = store.find_by_username("alice").await.unwrap().unwrap();
    assert!(record.is_premium);
    assert_eq!(record.id, verified_id());
    assert_eq!(record.username, "alice");
    assert_eq!(record.last_address, "203.0.113.7");

    let session = sessions.get("alice").unwrap();
    assert!(session.authenticated);
    assert!(session.logged_in);
    assert!(!session.need_auth);
    assert_eq!(session.connection_id, Some(verified_id()));
    assert_eq!(sessions.identity(verified_id()).unwrap().username, "alice");
}

#[tokio::test]
async fn test_finalize_returning_premium_writes_nothing() {
    let store = store_with_record("alice", true).await;
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, sessions) = gate_with(store.clone(), resolver, GateConfig::default());

    let decision = gate.decide_pre_login("alice").await;
    assert_eq!(decision, PreLoginDecision::ForceVerified);

    let outcome = gate.finalize_login("alice", verified_id(), remote_addr()).await;

    assert_eq!(outcome, LoginOutcome::PremiumBypass);
    assert_eq!(store.len().await, 1, "no second record for a returning player");

    let session = sessions.get("alice").unwrap();
    assert!(session.authenticated);
    assert!(session.logged_in);
    assert!(!session.need_auth);
}

#[tokio::test]
async fn test_finalize_unverified_needs_interactive_auth() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, sessions) = gate_with(store.clone(), resolver, GateConfig::default());

    let decision = gate.decide_pre_login("cracked_joe").await;
    assert_eq!(decision, PreLoginDecision::ForceUnverified);

    let outcome = gate.finalize_login("cracked_joe", Uuid::new_v4(), remote_addr()).await;

    assert_eq!(outcome, LoginOutcome::NeedsAuth);
    assert!(store.is_empty().await, "nothing is persisted for unverified sessions");

    let session = sessions.get("cracked_joe").unwrap();
    assert!(!session.authenticated);
    assert!(!session.logged_in);
    assert!(session.need_auth);
}

#[tokio::test]
async fn test_finalize_cracked_record_needs_auth() {
    let store = store_with_record("bob", false).await;
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, sessions) = gate_with(store, resolver, GateConfig::default());

    gate.decide_pre_login("bob").await;
    let outcome = gate.finalize_login("bob", Uuid::new_v4(), remote_addr()).await;

    assert_eq!(outcome, LoginOutcome::NeedsAuth);
    assert!(sessions.get("bob").unwrap().need_auth);
}

#[tokio::test]
async fn test_finalize_persistence_failure_keeps_verified_session() {
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, sessions) = gate_with(Arc::new(FailingStore), resolver, GateConfig::default());

    gate.decide_pre_login("alice").await;
    let outcome = gate.finalize_login("alice", verified_id(), remote_addr()).await;

    // The write failed but the already-granted verified session stands.
    assert_eq!(outcome, LoginOutcome::RegisteredPremium);
    let session = sessions.get("alice").unwrap();
    assert!(session.authenticated);
    assert!(session.logged_in);
    assert!(!session.need_auth);
}

#[tokio::test]
async fn test_finalize_store_read_failure_degrades_to_needs_auth() {
    // No pending entry and an unreachable store: the session cannot be
    // proven premium, so finalization falls back to interactive auth.
    let resolver = CountingResolver::new(Resolution::NotVerified);
    let (gate, sessions) = gate_with(Arc::new(UnreachableStore), resolver, GateConfig::default());

    gate.decide_pre_login("alice").await;
    let outcome = gate.finalize_login("alice", Uuid::new_v4(), remote_addr()).await;

    assert_eq!(outcome, LoginOutcome::NeedsAuth);
    let session = sessions.get("alice").unwrap();
    assert!(!session.authenticated);
    assert!(!session.logged_in);
    assert!(session.need_auth);
}

#[tokio::test]
async fn test_finalize_uses_transport_verified_id() {
    // The id the transport verified at finalization time is
    // authoritative, whatever the providers said earlier.
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Verified(Uuid::new_v4()));
    let (gate, _) = gate_with(store.clone(), resolver, GateConfig::default());
    let transport_id = verified_id();

    gate.decide_pre_login("alice").await;
    gate.finalize_login("alice", transport_id, remote_addr()).await;

    let record = store.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(record.id, transport_id);
}

// =========================================================================
// disconnect
// =========================================================================

#[tokio::test]
async fn test_disconnect_preserves_pending_entry() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, sessions) = gate_with(store, resolver.clone(), GateConfig::default());

    gate.decide_pre_login("alice").await;
    assert!(gate.pending().contains("alice"));

    // The transport kicked the client for failing the challenge.
    gate.handle_disconnect(verified_id(), "alice");

    assert!(
        gate.pending().contains("alice"),
        "the pending entry must survive the disconnect for the double join"
    );
    let session = sessions.get("alice").unwrap();
    assert!(session.last_disconnect_ms > 0);

    // And the retry is recognized without another provider query.
    let retry = gate.decide_pre_login("alice").await;
    assert_eq!(retry, PreLoginDecision::ForceUnverified);
    assert_eq!(resolver.calls(), 1);
}

#[tokio::test]
async fn test_disconnect_detaches_identity_and_stamps_session() {
    let store = Arc::new(MemoryPlayerStore::new());
    let resolver = CountingResolver::new(Resolution::Verified(verified_id()));
    let (gate, sessions) = gate_with(store, resolver, GateConfig::default());

    gate.decide_pre_login("alice").await;
    gate.finalize_login("alice", verified_id(), remote_addr()).await;
    assert!(sessions.identity(verified_id()).is_some());

    gate.handle_disconnect(verified_id(), "alice");

    assert!(sessions.identity(verified_id()).is_none());
    let session = sessions.get("alice").unwrap();
    assert!(!session.is_connected());
    assert!(session.connection_id.is_none());
    assert!(sessions.get("alice").is_some(), "the session outlives the disconnect");
}
