//! deckgen server entry point.
//!
//! Wires the process together: logging, configuration, one shared HTTP
//! transport to the inference runtime, the deck generator, and the axum
//! router. The transport is constructed here and injected; nothing else
//! in the crate owns connection lifecycle.

use std::sync::Arc;

use deckgen::config::Config;
use deckgen::deck::DeckGenerator;
use deckgen::server::{router, AppState};
use deckgen::transport::{HttpTransport, SharedTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("failed to load configuration");
    tracing::info!(
        region = %config.region,
        text_model = %config.text_model,
        image_model = %config.image_model,
        "loaded configuration"
    );

    std::fs::create_dir_all(&config.output_dir).expect("failed to create output directory");

    let transport: SharedTransport =
        Arc::new(HttpTransport::new(&config).expect("failed to build inference transport"));
    let state = Arc::new(AppState {
        generator: DeckGenerator::new(transport, &config),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind server address");
    tracing::info!(addr = %config.bind_addr, "deckgen listening");

    axum::serve(listener, router(state))
        .await
        .expect("server error");
}
