// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: foods, days, entries, calendar and
//! settings.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{DailyRollup, FoodReference, LoggedEntry, SharedDay, UserSettings};
use crate::services::calendar::CalendarMonth;
use crate::services::ledger::{DayView, EntryEdit, NewEntry};
use crate::services::portion::{self, Portion};
use crate::time_utils::{now_rfc3339, parse_date, YearMonth};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/foods/search", get(search_foods))
        .route("/api/foods/portion", get(preview_portion))
        .route("/api/days/{date}", get(get_day))
        .route("/api/days/{date}/entries", post(add_entry))
        .route("/api/days/{date}/reconcile", post(reconcile_day))
        .route("/api/days/{date}/share", post(share_day))
        .route("/api/entries/{id}", put(edit_entry).delete(delete_entry))
        .route("/api/entries/{id}/copy", post(copy_entry))
        .route("/api/calendar", get(get_calendar))
        .route("/api/settings", get(get_settings).put(put_settings))
}

// ─── Foods ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_foods(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<FoodReference>> {
    Json(state.catalog.search(&query.q).into_iter().cloned().collect())
}

#[derive(Deserialize)]
struct PortionQuery {
    name: String,
    grams: Option<f64>,
}

/// Portion preview for the add-food form.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PortionResponse {
    pub name: String,
    #[serde(flatten)]
    pub portion: Portion,
}

async fn preview_portion(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortionQuery>,
) -> Result<Json<PortionResponse>> {
    portion::check_grams(query.grams)?;
    let food = state.catalog.find(&query.name)?;
    Ok(Json(PortionResponse {
        name: food.name.clone(),
        portion: portion::compute(food, query.grams),
    }))
}

// ─── Days ────────────────────────────────────────────────────

async fn get_day(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<DayView>> {
    let date = parse_date(&date)?;
    Ok(Json(state.ledger.view_day(&user.user_id, date).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddEntryRequest {
    #[validate(length(min = 1, max = 200, message = "food_name is required"))]
    pub food_name: String,
    /// Missing, zero or negative grams mean 100 g
    #[validate(range(max = 10000.0, message = "grams must be at most 10000"))]
    pub grams: Option<f64>,
    pub time: Option<String>,
}

async fn add_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(req): Json<AddEntryRequest>,
) -> Result<(StatusCode, Json<LoggedEntry>)> {
    let date = parse_date(&date)?;
    req.validate()?;

    let entry = state
        .ledger
        .add_entry(
            &user.user_id,
            date,
            NewEntry {
                food_name: req.food_name,
                grams: req.grams,
                time: req.time,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn reconcile_day(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<DailyRollup>> {
    let date = parse_date(&date)?;
    Ok(Json(state.ledger.reconcile_day(&user.user_id, date).await?))
}

/// Response for a newly shared day.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ShareResponse {
    pub token: String,
    /// Public path of the snapshot
    pub path: String,
}

impl From<&SharedDay> for ShareResponse {
    fn from(shared: &SharedDay) -> Self {
        Self {
            token: shared.token.clone(),
            path: format!("/share/{}", shared.token),
        }
    }
}

async fn share_day(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<(StatusCode, Json<ShareResponse>)> {
    let date = parse_date(&date)?;
    let shared = state.sharing.share_day(&user.user_id, date).await?;
    Ok((StatusCode::CREATED, Json(ShareResponse::from(&shared))))
}

// ─── Entries ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct EditEntryRequest {
    #[validate(length(min = 1, max = 200, message = "food_name must not be empty"))]
    pub food_name: Option<String>,
    #[validate(range(max = 10000.0, message = "grams must be at most 10000"))]
    pub grams: Option<f64>,
    pub time: Option<String>,
}

async fn edit_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(entry_id): Path<String>,
    Json(req): Json<EditEntryRequest>,
) -> Result<Json<LoggedEntry>> {
    req.validate()?;

    let entry = state
        .ledger
        .edit_entry(
            &user.user_id,
            &entry_id,
            EntryEdit {
                food_name: req.food_name,
                grams: req.grams,
                time: req.time,
            },
        )
        .await?;

    Ok(Json(entry))
}

/// Response for entry deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteEntryResponse {
    pub success: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub day_total: i64,
}

async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(entry_id): Path<String>,
) -> Result<Json<DeleteEntryResponse>> {
    let rollup = state.ledger.delete_entry(&user.user_id, &entry_id).await?;
    Ok(Json(DeleteEntryResponse {
        success: true,
        day_total: rollup.total_calories,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct CopyEntryRequest {
    /// Target day (`YYYY-MM-DD`); the source entry's day when absent
    pub date: Option<String>,
}

async fn copy_entry(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(entry_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<LoggedEntry>)> {
    let req: CopyEntryRequest = optional_json(&body)?;
    let target = req.date.as_deref().map(parse_date).transpose()?;

    let entry = state
        .ledger
        .copy_entry(&user.user_id, &entry_id, target)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Parse an optional JSON body; an empty body yields the defaults.
pub(crate) fn optional_json<T>(body: &[u8]) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))
}

// ─── Calendar ────────────────────────────────────────────────

#[derive(Deserialize)]
struct CalendarQuery {
    /// `YYYY-MM`
    month: Option<String>,
}

async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>> {
    let month = query.month.as_deref().map(YearMonth::parse).transpose()?;
    Ok(Json(state.ledger.calendar(&user.user_id, month).await?))
}

// ─── Settings ────────────────────────────────────────────────

async fn get_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserSettings>> {
    Ok(Json(state.ledger.settings(&user.user_id).await?))
}

async fn put_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(mut settings): Json<UserSettings>,
) -> Result<Json<UserSettings>> {
    settings.validate()?;
    settings.updated_at = now_rfc3339();

    state
        .store
        .save_user_settings(&user.user_id, &settings)
        .await?;

    tracing::info!(user_id = %user.user_id, "Settings updated");
    Ok(Json(settings))
}
