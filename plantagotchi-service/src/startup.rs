//! Application startup and lifecycle management.

use crate::config::PlantConfig;
use crate::handlers;
use crate::services::providers::openai::{OpenAiChatProvider, OpenAiSettings};
use crate::services::providers::ChatProvider;
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::{make_request_span, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub chat_provider: Arc<dyn ChatProvider>,
}

impl AppState {
    pub fn new(chat_provider: Arc<dyn ChatProvider>) -> Self {
        Self { chat_provider }
    }
}

/// Build the HTTP router with all routes and layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::meta::root))
        .route("/health", get(handlers::meta::health_check))
        .route("/especie", post(handlers::species::species))
        .route(
            "/esplanta",
            get(handlers::question::is_plant).post(handlers::question::is_plant),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the OpenAI provider described by `config`.
    pub async fn build(config: PlantConfig) -> Result<Self, AppError> {
        let provider = OpenAiChatProvider::new(OpenAiSettings {
            api_key: config.api_key().to_string(),
            base_url: config.openai.base_url.clone(),
            model: config.openai.model.clone(),
            timeout: Duration::from_secs(config.openai.timeout_secs),
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;

        tracing::info!(
            model = %config.openai.model,
            base_url = %config.openai.base_url,
            "Initialized OpenAI chat provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: PlantConfig,
        chat_provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        chat_provider.health_check().await.map_err(|e| {
            tracing::error!("Chat provider is not usable: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e))
        })?;

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Plantagotchi service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            state: AppState::new(chat_provider),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests until the server fails or the future is dropped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);
        axum::serve(self.listener, router).await.map_err(|e| {
            tracing::error!("HTTP server error: {}", e);
            std::io::Error::other(format!("HTTP server error: {}", e))
        })
    }
}
