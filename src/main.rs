//! Globetrotter Back binary entrypoint wiring the REST API, configuration and storage.

use std::{env, net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use globetrotter_back::{
    config::AppConfig,
    dao::trivia_store::{TriviaStore, memory::MemoryStore},
    routes,
    services::{catalog::Catalog, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());
    start_storage(app_state.clone()).await;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Spawn the storage supervisor: MongoDB when `MONGO_URI` is set, the in-memory store otherwise.
async fn start_storage(state: SharedState) {
    let catalog_path = state.config().catalog_path.clone();

    #[cfg(feature = "mongo-store")]
    {
        if let Ok(uri) = env::var("MONGO_URI") {
            let db_name = env::var("MONGO_DB").ok();
            tokio::spawn(storage_supervisor::run(state, move || {
                connect_mongo(uri.clone(), db_name.clone(), catalog_path.clone())
            }));
            return;
        }
    }

    info!("MONGO_URI not set; serving from the in-memory store");
    let store: Arc<dyn TriviaStore> = Arc::new(MemoryStore::new());
    if let Some(path) = catalog_path.as_deref() {
        seed_catalog(&store, path).await;
    }
    tokio::spawn(storage_supervisor::run(state, move || {
        let store = store.clone();
        async move { Ok(store) }
    }));
}

#[cfg(feature = "mongo-store")]
async fn connect_mongo(
    uri: String,
    db_name: Option<String>,
    catalog_path: Option<std::path::PathBuf>,
) -> Result<Arc<dyn TriviaStore>, globetrotter_back::dao::storage::StorageError> {
    use globetrotter_back::dao::trivia_store::mongodb::{MongoConfig, MongoTriviaStore};

    let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
    let store: Arc<dyn TriviaStore> = Arc::new(MongoTriviaStore::connect(config).await?);
    if let Some(path) = catalog_path.as_deref() {
        seed_catalog(&store, path).await;
    }
    Ok(store)
}

async fn seed_catalog(store: &Arc<dyn TriviaStore>, path: &Path) {
    if let Err(err) = Catalog::new(store.clone()).seed_from_file(path).await {
        error!(error = %err, path = %path.display(), "failed to seed destination catalog");
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "could not install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
