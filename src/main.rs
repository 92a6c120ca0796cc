//! Chat widget - single-page chat backed by a generative-language API
//!
//! Serves one page whose transcript is driven by an exchange controller that
//! keeps at most one request to the answering service in flight.

mod api;
mod controller;
mod llm;
mod persona;
mod state_machine;
mod transcript;

use api::{create_router, AppState};
use controller::{ChatSnapshot, ExchangeController};
use llm::{LlmConfig, LlmService, ModelRegistry, RegistryService};
use state_machine::ExchangeContext;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Listen address settings
struct ServerConfig {
    bind: IpAddr,
    port: u16,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            bind: std::env::var("CHAT_BIND")
                .ok()
                .and_then(|b| b.parse().ok())
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: std::env::var("CHAT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_widget=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let server_config = ServerConfig::from_env();

    // Answering service
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            timeout_secs = llm_config.timeout.as_secs(),
            "Model registry initialized"
        );
    } else {
        tracing::warn!(
            "No answering service configured. Set GEMINI_API_KEY or LLM_GATEWAY; every reply will be the fallback."
        );
    }

    let llm: Arc<dyn LlmService> = Arc::new(RegistryService::new(llm_registry));
    let controller = Arc::new(ExchangeController::new(ExchangeContext::default(), llm));
    tracing::info!(model = %controller.model_id(), "Exchange controller ready");
    tokio::spawn(log_state_changes(controller.subscribe()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(AppState::new(controller)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(compression),
    );

    // Start server
    let addr = SocketAddr::new(server_config.bind, server_config.port);
    tracing::info!("Chat widget listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn log_state_changes(mut rx: broadcast::Receiver<ChatSnapshot>) {
    loop {
        match rx.recv().await {
            Ok(snapshot) => tracing::debug!(
                version = snapshot.version,
                turns = snapshot.transcript.len(),
                pending = snapshot.pending,
                "Chat state changed"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "State log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
