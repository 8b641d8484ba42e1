use clap::Parser;
use group_registry::api::handlers::{RegistryMaps, registry_router};
use group_registry::config::NodeConfig;
use group_registry::locked::map::LockedGroupMap;
use group_registry::storage::handlers::store_router;
use group_registry::storage::memory::MemoryCluster;
use group_registry::storage::remote::HttpCluster;
use group_registry::storage::store::Cluster;
use std::collections::HashMap;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NodeConfig::parse();
    init_tracing(config.verbose);

    tracing::info!("group-registry v{} starting", env!("CARGO_PKG_VERSION"));

    // 1. Shared store: host it here, or bind to the peer that does.
    let mut app = axum::Router::new();
    let cluster: Arc<dyn Cluster> = if config.hosts_store() {
        tracing::info!("Hosting shared maps on this node");
        let hosted = MemoryCluster::new();
        app = app.merge(store_router(hosted.clone()));
        hosted
    } else {
        let peer = config
            .store_peer
            .ok_or_else(|| anyhow::anyhow!("store peer missing"))?;
        tracing::info!("Using shared maps hosted on {}", peer);
        HttpCluster::new(peer)
    };

    // 2. Locked maps:
    let mut maps = HashMap::new();
    for name in &config.maps {
        let map = LockedGroupMap::init(cluster.as_ref(), name)
            .await
            .map_err(|e| anyhow::anyhow!("binding map {} failed: {}", name, e))?
            .with_retry_delay(config.retry_delay());
        tracing::info!("Bound locked map {}", name);
        maps.insert(name.clone(), map);
    }
    let maps: RegistryMaps = Arc::new(maps);

    // 3. HTTP router:
    let app = app.merge(registry_router(maps));

    // 4. Serve:
    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Node stopped");
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env();

    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        if let Ok(directive) = level.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
