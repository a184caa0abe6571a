// Civic Bridge - Web Server
// Loads the reference data once, then serves read-only lookups.

use anyhow::{Context, Result};
use civic_bridge::api::{router, AppState};
use civic_bridge::EngineConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    civic_bridge::init_tracing();

    let config = EngineConfig::from_env()?;

    // Load phase: a failure here stops the process before it binds
    let engine = config.load_engine()?;
    let integrity = engine.store().integrity();
    info!(
        municipalities = engine.stats().municipalities,
        fingerprint = %engine.stats().fingerprint,
        integrity_clean = integrity.is_clean(),
        "reference data ready"
    );

    let state = AppState {
        engine,
        config: Arc::new(config.clone()),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server running");
    info!("API: http://{}/api/lookup?q=Roma", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
