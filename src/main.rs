// SPDX-License-Identifier: MIT

//! Kine-Backend trigger service
//!
//! Hosts the Firestore trigger and scheduled-job endpoints for the
//! "Un Kine Amigo" appointment app.

use kine_backend::{config::Config, db::FirestoreDb, services::FcmClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        region = %config.gcp_region,
        "Starting Kine-Backend trigger service"
    );

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize FCM client
    let fcm = FcmClient::new(&config.gcp_project_id);
    tracing::info!(project = %config.gcp_project_id, "FCM client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        fcm,
    });

    // Build router
    let app = kine_backend::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kine_backend=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
