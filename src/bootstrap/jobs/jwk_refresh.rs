//! Periodic refresh of a configured [`Jwt`] hook's cached key set.
use std::sync::Arc;
use std::time::Duration;

use glowworm_hooks::Jwt;

/// Spawns a background task that calls [`Jwt::refresh`] every `interval`.
/// A fetch failure is logged and the previous key set is kept in place.
pub fn spawn(jwt: Arc<Jwt>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(error) = jwt.refresh().await {
                tracing::warn!(%error, "jwk set refresh failed, keeping previous key set");
            }
        }
    })
}
