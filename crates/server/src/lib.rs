//! LTDK backend: live queries over websocket, validated form actions and
//! direct client writes, on top of an Aurora-backed document store.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use ltdk_shared::{
    AppRegistry, BackendConfig, DocumentStore, MemoryStore, MEMBERSHIP_APPLICATIONS, MENTORSHIP_REQUESTS,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod frontend;
pub mod routes;
pub mod state;
pub mod ws;

use config::ServerConfig;
use db::PersistentStore;
use state::AppState;

/// Collections nobody may listen on.
pub const PRIVATE_COLLECTIONS: &[&str] = &[MEMBERSHIP_APPLICATIONS, MENTORSHIP_REQUESTS, "users"];

/// The live store with the server's read rules applied.
pub fn new_memory_store() -> MemoryStore {
    MemoryStore::new().with_private_collections(PRIVATE_COLLECTIONS.iter().copied())
}

/// Backend identity from `LTDK_*` variables, or a local development identity
/// when no API key is configured at all.
pub fn backend_config_from_env() -> anyhow::Result<BackendConfig> {
    if std::env::var("LTDK_API_KEY").is_err() {
        tracing::warn!("LTDK_API_KEY not set, using local development backend identity");
        return Ok(BackendConfig::local("ltdk-maradi"));
    }
    Ok(BackendConfig::from_env()?)
}

/// Open the store, apply the seed file, and initialize the backend connection.
pub async fn build_state(config: &ServerConfig, backend: &BackendConfig) -> anyhow::Result<AppState> {
    let memory = new_memory_store();
    let store = match &config.db_path {
        Some(path) => PersistentStore::load(memory, db::open_database(path)?).await?,
        None => {
            tracing::warn!("No database path configured, documents live in memory only");
            PersistentStore::in_memory(memory)
        }
    };

    if let Some(seed) = &config.seed_file {
        db::seed_from_file(&store, seed).await?;
    }

    let registry = AppRegistry::with_store(Arc::new(store) as Arc<dyn DocumentStore>);
    let connection = registry.initialize(backend)?;
    Ok(AppState::new(connection, config.base_url.clone()))
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health))
        // Live queries
        .route("/api/ws", get(ws::ws_handler))
        // Form actions
        .route("/api/actions/{kind}", post(routes::actions::submit_action))
        // Direct client writes
        .route(
            "/api/collections/{collection}/documents",
            post(routes::collections::create_document),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
