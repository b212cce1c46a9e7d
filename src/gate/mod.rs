//! Connection gating module.
//!
//! The decision engine behind the proxy's connection phases:
//!
//! - **Pre-login**: decide per-username whether the transport must
//!   demand cryptographic proof of account ownership (verified/premium
//!   mode) or accept the claimed name as-is (unverified/cracked mode).
//! - **Login finalization**: once the forced mode completed, settle the
//!   session flags and register first-time premium accounts.
//! - **Disconnect**: update session lifecycle state.
//!
//! The gate recognizes the "double join": forcing verified mode on an
//! unverifiable client makes the transport disconnect it, and the
//! client's launcher retries within milliseconds. The retry is let in
//! unverified without a second provider query.

pub mod manager;
pub mod pending;

pub use manager::{ConnectionGate, LoginOutcome, PreLoginDecision};
pub use pending::PendingVerificationCache;
