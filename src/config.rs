//! Gate configuration module.
//!
//! Every time window and timeout used by the gate, the identity resolver,
//! and the session reaper lives here so hosts can tune them in one place.

use serde::{Deserialize, Serialize};
use std::env;

/// Configuration for the connection gate and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Double-join recognition window in milliseconds.
    ///
    /// A reconnection attempt for a username with a pending verification
    /// entry younger than this is treated as the same client retrying
    /// after a failed verified-mode challenge and is let in unverified.
    pub double_join_window_ms: i64,

    /// How long a disconnected session is retained before the reaper
    /// evicts it, in seconds.
    pub session_retention_secs: u64,

    /// How often the session reaper scans the registry, in seconds.
    pub reaper_period_secs: u64,

    /// Connect timeout for each identity provider lookup, in milliseconds.
    pub provider_connect_timeout_ms: u64,

    /// Total request timeout for each identity provider lookup, in
    /// milliseconds. Kept short so a dead provider cannot stall the
    /// proxy; worst-case gate latency is roughly this times the number
    /// of providers in the chain.
    pub provider_read_timeout_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            double_join_window_ms: 15_000,
            session_retention_secs: 15 * 60,
            reaper_period_secs: 60,
            provider_connect_timeout_ms: 2_500,
            provider_read_timeout_ms: 2_500,
        }
    }
}

impl GateConfig {
    /// Create configuration from environment variables.
    ///
    /// Recognized variables (all optional, invalid values fall back to
    /// the defaults):
    /// - `AUTH_GATE_DOUBLE_JOIN_WINDOW_MS` (default: 15000)
    /// - `AUTH_GATE_SESSION_RETENTION_SECS` (default: 900)
    /// - `AUTH_GATE_REAPER_PERIOD_SECS` (default: 60)
    /// - `AUTH_GATE_PROVIDER_CONNECT_TIMEOUT_MS` (default: 2500)
    /// - `AUTH_GATE_PROVIDER_READ_TIMEOUT_MS` (default: 2500)
    ///
    /// # Returns
    ///
    /// * `GateConfig` - Configuration from environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            double_join_window_ms: env::var("AUTH_GATE_DOUBLE_JOIN_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.double_join_window_ms),
            session_retention_secs: env::var("AUTH_GATE_SESSION_RETENTION_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_retention_secs),
            reaper_period_secs: env::var("AUTH_GATE_REAPER_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reaper_period_secs),
            provider_connect_timeout_ms: env::var("AUTH_GATE_PROVIDER_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider_connect_timeout_ms),
            provider_read_timeout_ms: env::var("AUTH_GATE_PROVIDER_READ_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider_read_timeout_ms),
        }
    }
}
