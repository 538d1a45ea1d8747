// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal plan routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{LoggedEntry, MealPlanTemplate, MealType, PlannedItem};
use crate::routes::api::optional_json;
use crate::services::planner::{NewPlannedItem, PlanView};
use crate::time_utils::parse_date;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Meal plan routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/plans", get(list_plans).post(create_plan))
        .route("/api/plans/active", get(get_active_plan))
        .route("/api/plans/{id}", get(get_plan).delete(delete_plan))
        .route("/api/plans/{id}/active", put(activate_plan))
        .route("/api/plans/{id}/items", post(add_item))
        .route("/api/plans/{id}/items/{item_id}", delete(remove_item))
        .route("/api/plans/{id}/items/{item_id}/log", post(log_item))
}

// ─── Templates ───────────────────────────────────────────────

async fn list_plans(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MealPlanTemplate>>> {
    Ok(Json(state.planner.list_templates(&user.user_id).await?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<MealPlanTemplate>)> {
    req.validate()?;
    let template = state
        .planner
        .create_template(&user.user_id, &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn get_active_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Option<PlanView>>> {
    Ok(Json(state.planner.active_plan(&user.user_id).await?))
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(template_id): Path<String>,
) -> Result<Json<PlanView>> {
    Ok(Json(
        state.planner.view_plan(&user.user_id, &template_id).await?,
    ))
}

#[derive(Serialize)]
pub struct DeletePlanResponse {
    pub success: bool,
}

async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(template_id): Path<String>,
) -> Result<Json<DeletePlanResponse>> {
    state
        .planner
        .delete_template(&user.user_id, &template_id)
        .await?;
    Ok(Json(DeletePlanResponse { success: true }))
}

async fn activate_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(template_id): Path<String>,
) -> Result<Json<MealPlanTemplate>> {
    Ok(Json(
        state.planner.activate(&user.user_id, &template_id).await?,
    ))
}

// ─── Planned Items ───────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct AddPlannedItemRequest {
    pub meal_type: MealType,
    #[validate(length(min = 1, max = 200, message = "food_name is required"))]
    pub food_name: String,
    #[validate(range(
        exclusive_min = 0.0,
        max = 10000.0,
        message = "grams must be greater than zero and at most 10000"
    ))]
    pub grams: f64,
}

async fn add_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(template_id): Path<String>,
    Json(req): Json<AddPlannedItemRequest>,
) -> Result<(StatusCode, Json<PlannedItem>)> {
    req.validate()?;
    let item = state
        .planner
        .add_item(
            &user.user_id,
            &template_id,
            NewPlannedItem {
                meal_type: req.meal_type,
                food_name: req.food_name,
                grams: req.grams,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((template_id, item_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .planner
        .remove_item(&user.user_id, &template_id, &item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct LogItemRequest {
    /// Day to log on (`YYYY-MM-DD`); the user's today when absent
    pub date: Option<String>,
}

async fn log_item(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((template_id, item_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<(StatusCode, Json<LoggedEntry>)> {
    let req: LogItemRequest = optional_json(&body)?;
    let date = req.date.as_deref().map(parse_date).transpose()?;

    let entry = state
        .planner
        .log_item(&user.user_id, &template_id, &item_id, date)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
