//! HTTP server assembly and lifecycle

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::core::{Config, ServerState};
use crate::utils::AppError;

/// Assemble the API routers (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::users::router())
        .merge(crate::api::products::router())
        .merge(crate::api::product_images::router())
        .merge(crate::api::orders::router())
        .merge(crate::api::reports::router())
}

/// Full router with auth middleware, static file serving and the HTTP
/// layers applied. Also the entry point for in-process tests.
pub fn build_router(state: ServerState) -> Router {
    let public_dir = state.public_dir();

    build_app()
        // Applied at router level; require_auth skips the public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        // Generated images and reports are served from the public tree
        .nest_service("/files", ServeDir::new(public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create a server around existing state (shared with tests or tools)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        let app = build_router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("Store API server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        Ok(())
    }
}
