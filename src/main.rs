use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wholesale_recommender::{
    api::{create_router, AppState},
    config::{CatalogBackend, Config},
    db::{create_pool, CatalogStore, DirectoryCatalogStore, PostgresCatalogStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wholesale_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CatalogStore> = match config.catalog_backend {
        CatalogBackend::Directory => {
            Arc::new(DirectoryCatalogStore::new(config.catalog_dir.clone()))
        }
        CatalogBackend::Postgres => {
            Arc::new(PostgresCatalogStore::new(create_pool(&config.database_url)?))
        }
    };

    tracing::info!(
        backend = store.name(),
        limit = config.recommendation_limit,
        granularity = ?config.bucket_granularity,
        "Starting recommendation service"
    );

    let state = AppState::from_config(store, &config);

    // Serve even without an initial snapshot; requests report unavailability
    // until a refresh succeeds
    if let Err(e) = state.loader.refresh().await {
        tracing::error!(error = %e, "Initial snapshot load failed");
    }

    if let Some(period) = config.refresh_interval() {
        let _refresh_task = state.loader.clone().spawn_periodic_refresh(period);
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
