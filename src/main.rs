//! TwiliTransit - a guided transit journey over SMS/RCS
//!
//! Inbound messages arrive on a webhook, drive a per-traveller state
//! machine, and are answered with rich content templates or plain text.

mod api;
mod config;
mod journey;
mod messaging;
mod runtime;

use api::{create_router, AppState};
use config::TransitConfig;
use messaging::{LoggingMessenger, TwilioClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twilitransit=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = TransitConfig::from_env();
    for name in config.missing_settings() {
        tracing::warn!(setting = name, "Missing environment variable");
    }

    tracing::info!(
        customer = %config.customer_name,
        timing = config.timing.as_str(),
        "Journey settings"
    );

    // Messaging provider
    let twilio = TwilioClient::new(config.twilio.clone())?;
    let messenger = Arc::new(LoggingMessenger::new(Arc::new(twilio)));

    // Create application state
    let state = AppState::new(&config, messenger);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new().gzip(true).br(true).deflate(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("TwiliTransit server listening on {}", addr);
    tracing::info!(
        webhook_url = config.webhook_url.as_deref().unwrap_or("(not set)"),
        "Point the messaging service's inbound webhook here"
    );
    tracing::info!(
        setup = "POST /setup-templates",
        analytics = "GET /analytics",
        clear = "POST /clear-sessions",
        "Operational routes"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
