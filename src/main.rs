//! yuan-chat - chat front-end for the `ChatYuan` dialogue model
//!
//! Serves a chat page and a small JSON API. Each turn is answered by one call
//! to either a locally hosted model server or the hosted `ChatYuan` API.

mod api;
mod codec;
mod config;
mod conversation;
mod gateway;

use api::{create_router, AppState};
use config::ChatConfig;
use conversation::ConversationController;
use gateway::build_gateway;
use std::net::SocketAddr;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yuan_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ChatConfig::from_env()?;

    // One gateway for the whole process, shared by every conversation
    let gateway = build_gateway(&config.gateway)?;
    tracing::info!(
        backend = %config.gateway.backend,
        requires_api_key = gateway.requires_api_key(),
        "Generation gateway initialized"
    );
    if gateway.requires_api_key() {
        tracing::warn!("No CLUEAI_API_KEY configured; every request must carry its own key");
    }

    let controller = ConversationController::new(gateway).with_preamble(config.preamble);
    let state = AppState::new(controller);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("yuan-chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
