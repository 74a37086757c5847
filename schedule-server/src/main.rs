use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use schedule_server::config::ServerConfig;
use schedule_server::store::MemoryStore;
use schedule_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("schedule_server=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    // Load the catalog, or start empty without a snapshot
    let store = match &config.snapshot {
        Some(path) => MemoryStore::load_snapshot(path)?,
        None => MemoryStore::new(),
    };

    let addr = config.bind;
    let static_dir = config.static_dir.clone();
    let state = AppState::new(store, config);
    let app = create_router(state, &static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Schedule server listening");
    info!("  GET  /health                               - Health check");
    info!("  GET  /stations/:id/times?date=&time=        - Station departures");
    info!("  GET  /users/:uid/locations/:id/times?limit= - Location board");

    axum::serve(listener, app).await?;
    Ok(())
}
