//! Binary entry point: loads configuration, assembles the tracker, starts
//! whichever frontends are enabled and their background jobs, then waits
//! for a shutdown signal.
use std::time::Duration;

use glowworm_tracker::bootstrap::{self, jobs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap::config::load()?;
    bootstrap::logging::init(&config.log_level);

    tracing::info!("starting glowworm-tracker");

    let app = bootstrap::app::build(&config).await?;

    let cleanup = jobs::swarm_cleanup::spawn(
        app.store.clone(),
        Duration::from_secs(app.storage.gc_interval),
        Duration::from_secs(app.storage.peer_lifetime),
    );

    let jwk_refresh = app.jwt_refresh.map(|(jwt, interval)| jobs::jwk_refresh::spawn(jwt, interval));

    let udp_running = match app.udp {
        Some((server, shared)) => Some(server.start(shared).await?),
        None => None,
    };
    let http_running = match app.http {
        Some((server, state)) => Some(server.start(state).await?),
        None => None,
    };

    if udp_running.is_none() && http_running.is_none() {
        tracing::warn!("neither the udp nor the http frontend is enabled; nothing is listening");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");

    cleanup.abort();
    if let Some(task) = jwk_refresh {
        task.abort();
    }

    if let Some(server) = udp_running {
        server.stop().await.map_err(|e| anyhow::anyhow!("{e:?}"))?;
    }
    if let Some(server) = http_running {
        server.stop().await.map_err(|e| anyhow::anyhow!("{e:?}"))?;
    }

    app.store.stop();

    Ok(())
}
