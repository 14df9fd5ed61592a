//! Background job: reclaim expired verification codes.
//!
//! Expiry is already enforced lazily on every verification; this sweep only
//! bounds memory held by codes that were requested and never checked.

use std::time::Duration;

use tokio::time;

use crate::verification::VerificationRegistry;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the background cleanup task. Call this once at startup.
pub fn spawn(registry: VerificationRegistry) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweep(&registry);
        }
    })
}

fn sweep(registry: &VerificationRegistry) -> usize {
    let removed = registry.evict_expired();
    if removed > 0 {
        tracing::debug!(removed, remaining = registry.len(), "evicted expired verification entries");
    }
    removed
}
