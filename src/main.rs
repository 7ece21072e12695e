use std::sync::Arc;

use actix_web::{App, HttpServer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod http;
mod metrics;
mod store;

use config::AppConfig;
use domain::user::{AccessToken, Role, User};
use store::Store;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront_api=debug")),
        )
        .init();

    tracing::info!("🚀 Starting Storefront API");

    let config = AppConfig::from_env();

    // === 1. Create the shared document store ===
    let store = Arc::new(Store::new());

    // === 2. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!(
        "📊 Metrics registry created with {} metrics",
        metrics.registry().gather().len()
    );

    // === 3. Bootstrap the administrative account, if configured ===
    if let (Some(email), Some(token)) = (&config.admin_email, &config.admin_token) {
        bootstrap_admin(&store, email, token).await;
    }

    // === 4. Serve the API ===
    tracing::info!("📡 Listening on http://{}:{}", config.host, config.port);

    let app_store = store.clone();
    let app_metrics = metrics.clone();
    HttpServer::new(move || {
        App::new().configure(http::configure(app_store.clone(), app_metrics.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

/// Seed the admin account named in the environment. Existing accounts are
/// left alone so restarts do not mint duplicate admins.
async fn bootstrap_admin(store: &Store, email: &str, token: &str) {
    if store.users.find_one(|u| u.email == email).await.is_some() {
        tracing::info!(email, "Admin account already present, skipping bootstrap");
        return;
    }

    let admin = store
        .users
        .insert(User::new(
            "Admin".to_string(),
            email.to_string(),
            Role::Admin,
        ))
        .await;
    store
        .tokens
        .insert(AccessToken::issue(admin.id, token.to_string()))
        .await;

    tracing::info!(email, user_id = %admin.id, "👤 Bootstrap admin registered");
}
