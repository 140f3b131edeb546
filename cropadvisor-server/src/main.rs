//! Crop Advisory Server
//!
//! Serves the advisory REST API backed by SQLite, or by in-memory stores
//! when no database path is configured.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cropadvisor_server::{
    routes, AccountStore, AppState, CatalogStore, Config, HttpRecommender, InMemoryAccountStore,
    InMemoryCatalogStore, InMemoryPredictionStore, PredictionStore, SqliteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cropadvisor_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    let recommender = Arc::new(HttpRecommender::new(config.recommender_url.clone()));
    tracing::info!(url = %recommender.predict_url(), "Using crop recommender");

    match config.database_path.clone() {
        Some(path) => {
            let store = Arc::new(SqliteStore::open(&path)?);
            tracing::info!(path = %path, "Opened SQLite database");
            serve(config, store.clone(), store.clone(), store, recommender).await
        }
        None => {
            tracing::warn!("DATABASE_PATH not set, data will not survive a restart");
            serve(
                config,
                Arc::new(InMemoryAccountStore::new()),
                Arc::new(InMemoryCatalogStore::new()),
                Arc::new(InMemoryPredictionStore::new()),
                recommender,
            )
            .await
        }
    }
}

async fn serve<A, C, P>(
    config: Config,
    account_store: Arc<A>,
    catalog_store: Arc<C>,
    prediction_store: Arc<P>,
    recommender: Arc<HttpRecommender>,
) -> Result<()>
where
    A: AccountStore + 'static,
    C: CatalogStore + 'static,
    P: PredictionStore + 'static,
{
    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(
        config,
        account_store,
        catalog_store,
        prediction_store,
        recommender,
    ));

    // Create router
    let app = routes::create_router(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Crop advisory API listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
