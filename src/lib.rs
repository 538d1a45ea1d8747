// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutri-Tracker: daily food log with calorie rollups
//!
//! This crate provides the backend API for logging foods from a fixed
//! nutrition table, keeping per-day calorie totals, and planning meals.

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::NutritionStore;
use services::{DailyLedger, FoodCatalog, MealPlanner, ShareService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn NutritionStore>,
    pub catalog: Arc<FoodCatalog>,
    pub ledger: Arc<DailyLedger>,
    pub planner: MealPlanner,
    pub sharing: ShareService,
}

impl AppState {
    /// Wire the services around one store and catalog.
    pub fn new(config: Config, store: Arc<dyn NutritionStore>, catalog: Arc<FoodCatalog>) -> Self {
        let ledger = Arc::new(DailyLedger::new(
            store.clone(),
            catalog.clone(),
            config.day_key_policy,
        ));
        let planner = MealPlanner::new(store.clone(), catalog.clone(), ledger.clone());
        let sharing = ShareService::new(store.clone());

        Self {
            config,
            store,
            catalog,
            ledger,
            planner,
            sharing,
        }
    }
}
