//! DocuVault API server binary.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use docuvault_server::{AppState, MemoryAccountDirectory, app};
use docuvault_session_store::{MemorySessionKeyStore, SessionKeyStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docuvault_server=debug,tower_http=debug".into()),
        )
        .init();

    let port: u16 = std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
    let sweep_interval = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map_or(Duration::from_secs(60 * 60), Duration::from_secs);

    // The sweep keeps memory bounded; correctness comes from the lazy
    // expiry check at read time.
    let store = Arc::new(MemorySessionKeyStore::new()).with_sweep_interval(sweep_interval);
    let accounts = Arc::new(MemoryAccountDirectory::new());

    let state = AppState::new(
        Arc::clone(&store) as Arc<dyn SessionKeyStore>,
        accounts,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "docuvault server listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    store.shutdown().await;
    Ok(())
}
