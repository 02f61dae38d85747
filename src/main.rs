// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use climbing_stats::application::snapshot_repository::SnapshotRepository;
use climbing_stats::domain::measures::registry;
use climbing_stats::infrastructure::config::{bind_address, load_server_config};
use climbing_stats::infrastructure::memory_repository::InMemorySnapshotRepository;
use climbing_stats::presentation::app_state::AppState;
use climbing_stats::presentation::router::create_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_server_config()?;

    // Build the registry up front so an inconsistent one fails at startup
    let registry = registry();
    tracing::info!("Measure registry holds {} measures", registry.len());

    // Create repository (infrastructure layer)
    let repository: Arc<dyn SnapshotRepository> = match &config.data.seed_path {
        Some(path) => Arc::new(InMemorySnapshotRepository::from_seed_file(path).await?),
        None => Arc::new(InMemorySnapshotRepository::new()),
    };

    // Create application state and router (application + presentation layers)
    let state = Arc::new(AppState::new(repository, registry));
    let router = create_router(state);

    let addr = bind_address(&config.server)?;
    tracing::info!("Starting climbing-stats service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
