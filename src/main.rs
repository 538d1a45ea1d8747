// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutri-Tracker API Server
//!
//! Logs foods against a fixed nutrition table and keeps per-day calorie
//! totals in Firestore.

use nutri_tracker::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, NutritionStore},
    services::FoodCatalog,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        day_key_policy = ?config.day_key_policy,
        "Starting Nutri-Tracker API"
    );

    // Initialize storage
    let store: Arc<dyn NutritionStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Load the food table
    let catalog = match &config.food_catalog_path {
        Some(path) => {
            tracing::info!(path = %path, "Loading food catalog");
            FoodCatalog::load_from_file(path)?
        }
        None => FoodCatalog::builtin()?,
    };
    tracing::info!(count = catalog.foods().len(), "Food catalog loaded");

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, Arc::new(catalog)));

    // Build router
    let app = nutri_tracker::routes::create_router(state);

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

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nutri_tracker=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
