// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public read-only access to shared days.

use crate::error::Result;
use crate::models::{DayTotals, SharedDay, SharedEntry};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

/// Share routes (public, no auth).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/share/{token}", get(get_shared_day))
}

/// Shared day as seen by anyone holding the link. The owner is not exposed.
#[derive(Serialize)]
pub struct SharedDayResponse {
    pub date: NaiveDate,
    pub entries: Vec<SharedEntry>,
    pub totals: DayTotals,
    pub alkaline_percent: Option<f64>,
    pub shared_at: String,
}

impl From<SharedDay> for SharedDayResponse {
    fn from(shared: SharedDay) -> Self {
        Self {
            date: shared.date,
            entries: shared.entries,
            totals: shared.totals,
            alkaline_percent: shared.alkaline_percent,
            shared_at: shared.created_at,
        }
    }
}

async fn get_shared_day(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<SharedDayResponse>> {
    let shared = state.sharing.get_shared(&token).await?;
    Ok(Json(shared.into()))
}
