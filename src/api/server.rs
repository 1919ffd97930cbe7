use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::handler::HandlerWithoutStateExt;
use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::{films, services, state::AppState, users};
use crate::config::{Config, CorsConfig};
use crate::store::{self, FjallDocumentStore};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Open the document store with the indexes the API relies on
pub fn open_store(path: &Path) -> store::Result<FjallDocumentStore> {
    FjallDocumentStore::open(path)?.with_unique_index(users::COLLECTION, users::EMAIL_FIELD)
}

/// Build the full application router around `state`
pub fn router(state: AppState) -> Router {
    let public_dir = state.config.server.public_dir.clone();
    let cors = cors_layer(&state.config.cors);

    let app = Router::new()
        .route("/api/films", get(films::list_films).post(films::create_film))
        .route(
            "/api/films/{id}",
            get(films::get_film)
                .put(films::update_film)
                .delete(films::delete_film),
        )
        .route("/api/utilisateurs/inscription", post(users::register))
        .route("/api/utilisateurs/connexion", post(users::login))
        .route("/health", get(services::health))
        .method_not_allowed_fallback(services::not_found);

    let app = if public_dir.is_dir() {
        info!(path = %public_dir.display(), "Serving static files");
        app.fallback_service(
            ServeDir::new(public_dir)
                .call_fallback_on_method_not_allowed(true)
                .not_found_service(services::not_found.into_service()),
        )
    } else {
        app.fallback(services::not_found)
    };

    app.with_state(state)
        // Transparently decompress gzip request bodies before they are read
        .layer(RequestDecompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub async fn run(address: Option<SocketAddr>, config_path: Option<PathBuf>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let mut config =
        Config::load_with(config_path).map_err(|e| format!("Failed to load config: {}", e))?;
    if let Some(address) = address {
        config.server.bind_addr = address;
    }

    let store = open_store(&config.server.data_path)
        .map_err(|e| format!("Failed to open document store: {}", e))?;

    let address = config.server.bind_addr;
    let state = AppState::new(config, Arc::new(store.clone()));
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Filmotheque API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.persist()?;
    info!("Document store flushed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
