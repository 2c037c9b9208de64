//! `ServeEase` booking assistant
//!
//! Webhook service that walks messaging-channel users through a service
//! booking (service, date, slot, employee, confirmation), one prompt per
//! inbound message.

mod api;
mod config;
mod db;
mod dispatcher;
mod notifier;
mod runtime;
mod session;
mod state_machine;
mod store;

use api::{create_router, AppState};
use config::AppConfig;
use db::Database;
use notifier::{DryRunNotifier, Notifier, TwilioNotifier};
use runtime::BookingRuntime;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use store::SessionStore;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serve_ease=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&config.db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // A missing store is a configuration error, not a per-request one
    tracing::info!(path = %config.db_path, "Opening session database");
    let store: Arc<dyn SessionStore> = Arc::new(Database::open(&config.db_path)?);

    let notifier: Arc<dyn Notifier> = if let Some(credentials) = config.twilio.clone() {
        tracing::info!(from = %credentials.from, "Twilio notifier configured");
        Arc::new(TwilioNotifier::new(credentials))
    } else {
        tracing::warn!(
            "Twilio credentials not configured. Set TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER; replies will only be logged."
        );
        Arc::new(DryRunNotifier)
    };

    let runtime = BookingRuntime::new(
        store,
        notifier,
        config.templates.clone(),
        config.session_ttl,
    );
    let app = create_router(AppState::new(runtime)).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("ServeEase webhook listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
