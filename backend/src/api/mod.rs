// HTTP surface: routing, shared state and the server loop.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ai::{IconLibrary, LayerCatalog, NetworkStore};
use crate::config::{AuthConfig, Config};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<NetworkStore>>,
    pub catalog: Arc<LayerCatalog>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(catalog: LayerCatalog, auth: AuthConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(NetworkStore::new())),
            catalog: Arc::new(catalog),
            auth: Arc::new(auth),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let icons = match &config.assets_dir {
            Some(dir) => IconLibrary::load(dir),
            None => IconLibrary::embedded(),
        };
        Self::new(LayerCatalog::new(icons), config.auth.clone())
    }

    // No store operation can be left half-applied, so a poisoned lock is still usable
    pub fn lock_store(&self) -> MutexGuard<'_, NetworkStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn router(state: AppState) -> Router {
    let networks = Router::new()
        .route("/api/networks", post(handlers::create_network).get(handlers::list_networks))
        .route(
            "/api/networks/:network_id",
            get(handlers::get_network).delete(handlers::delete_network),
        )
        .route("/api/networks/:network_id/layers", post(handlers::add_layer))
        .route("/api/networks/:network_id/connections", post(handlers::connect_layers))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_token));

    Router::new()
        .route("/", get(handlers::hello_world))
        .route("/api/test", get(handlers::test))
        .route("/api/login", post(auth::login))
        .route("/api/layer-types", get(handlers::list_layer_types))
        .route("/api/layer-types/:name", get(handlers::get_layer_type))
        .merge(networks)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);
    if state.auth.require_auth {
        tracing::info!("🔒 Network routes require a bearer token");
    }
    let app = router(state);

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🚀 Network builder backend listening on http://{}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
