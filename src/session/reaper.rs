//! Periodic session eviction task.

use super::registry::SessionRegistry;
use crate::config::GateConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// Periodic task that evicts sessions disconnected longer than the
/// retention window.
///
/// Runs on its own schedule, independent of connection handling; it only
/// ever removes disconnected, expired entries, so it needs no
/// coordination beyond the registry's own thread safety.
pub struct SessionReaper;

impl SessionReaper {
    /// Spawn the reaper on the current tokio runtime.
    ///
    /// Scans every `config.reaper_period_secs` and evicts sessions whose
    /// disconnect time is older than `config.session_retention_secs`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Session registry to scan
    /// * `config` - Supplies the scan period and the retention window
    ///
    /// # Returns
    ///
    /// * `JoinHandle<()>` - Task handle; abort it on shutdown
    pub fn spawn(registry: Arc<SessionRegistry>, config: &GateConfig) -> JoinHandle<()> {
        let period = Duration::from_secs(config.reaper_period_secs);
        let retention_ms = (config.session_retention_secs * 1000) as i64;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.reap_expired(retention_ms);
                if evicted > 0 {
                    log::info!("Session reaper evicted {} expired sessions", evicted);
                }
            }
        })
    }
}
