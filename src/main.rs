// SPDX-License-Identifier: MIT

//! FitSync Stats API Server
//!
//! Hosts the daily aggregation pipeline and the incremental team-update
//! trigger behind a small HTTP surface for the scheduler and admins.

use fitsync_stats::{
    config::Config,
    db::{FirestoreDb, StatsStore},
    services::{AggregationService, TeamTotalsService},
    AppState,
};
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
        timezone = %config.reference_timezone,
        "Starting FitSync Stats API"
    );

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");
    let store: Arc<dyn StatsStore> = Arc::new(db);

    // Build the engines on the shared store handle
    let aggregation = AggregationService::new(store.clone(), config.reference_timezone);
    let team_totals = TeamTotalsService::new(store);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        aggregation,
        team_totals,
    });

    // Build router
    let app = fitsync_stats::routes::create_router(state);

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
                .add_directive("fitsync_stats=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
