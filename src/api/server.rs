//! Store REST service implementation.
//!
//! HTTP surface over an [`SsStore`]: seven routes under `/api/store`, JSON
//! bodies, structured JSON errors, CORS open to any origin.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::store::SsStore;

use super::handlers::{self, DomainStatusMap};

/// API server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state: the store handle and the domain-code-to-status
/// table, injected explicitly rather than held in process globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SsStore>,
    pub statuses: Arc<DomainStatusMap>,
}

impl AppState {
    pub fn new(store: Arc<dyn SsStore>) -> Self {
        Self {
            store,
            statuses: Arc::new(DomainStatusMap::default()),
        }
    }

    pub fn with_statuses(store: Arc<dyn SsStore>, statuses: DomainStatusMap) -> Self {
        Self {
            store,
            statuses: Arc::new(statuses),
        }
    }
}

/// Build the store service router. Split out from [`run_api_server`] so
/// tests can drive it without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/store/:spread_sheet_name",
            get(handlers::read_sheet)
                .put(handlers::replace_sheet)
                .patch(handlers::update_sheet)
                .delete(handlers::clear_sheet)
                .fallback(handlers::not_found),
        )
        .route(
            "/api/store/:spread_sheet_name/:cell_id",
            put(handlers::replace_cell)
                .patch(handlers::update_cell)
                .delete(handlers::delete_cell)
                .fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the store REST service until SIGINT/SIGTERM.
pub async fn run_api_server(config: ApiConfig, store: Arc<dyn SsStore>) -> anyhow::Result<()> {
    let app = router(AppState::new(store));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("spreadsheet store service listening on http://{}", addr);
    info!("   routes: GET|PUT|PATCH|DELETE /api/store/{{name}}, PUT|PATCH|DELETE /api/store/{{name}}/{{cellId}}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("store service shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn config_address_format() {
        let config = ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn state_shares_one_store_handle() {
        let store: Arc<dyn SsStore> = Arc::new(MemStore::new());
        let state = AppState::new(Arc::clone(&store));
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.store, &cloned.store));
    }
}
