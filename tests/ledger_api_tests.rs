// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end ledger tests through the HTTP API.
//!
//! These tests verify that:
//! 1. Adds, edits and deletes move the day's rollup by the calorie delta
//! 2. A failing rollup write leaves no orphan entry behind
//! 3. Reconcile repairs a drifted rollup
//! 4. The calendar reads totals from the rollups

use axum::http::StatusCode;
use nutri_tracker::db::NutritionStore;
use nutri_tracker::time_utils::YearMonth;
use serde_json::json;

mod common;

const DAY: &str = "2024-02-05";

#[tokio::test]
async fn test_day_scenario_84_303_331_219() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);
    let entries_uri = format!("/api/days/{}/entries", DAY);
    let day_uri = format!("/api/days/{}", DAY);

    let (status, apple) = common::send(
        &app,
        "POST",
        &entries_uri,
        Some(&token),
        Some(json!({ "food_name": "Maçã", "grams": 150, "time": "08:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(apple["nutrients"]["calories"], 84);
    assert_eq!(apple["nutrients"]["protein"], 0.5);
    let apple_id = apple["id"].as_str().unwrap().to_string();

    let (_, day) = common::send(&app, "GET", &day_uri, Some(&token), None).await;
    assert_eq!(day["rollup_total"], 84);

    let (status, beef) = common::send(
        &app,
        "POST",
        &entries_uri,
        Some(&token),
        Some(json!({ "food_name": "Patinho moído, grelhado", "time": "12:30" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(beef["grams"], 100.0);
    let beef_id = beef["id"].as_str().unwrap().to_string();

    let (_, day) = common::send(&app, "GET", &day_uri, Some(&token), None).await;
    assert_eq!(day["rollup_total"], 303);
    assert_eq!(day["totals"]["calories"], 303);

    let (status, edited) = common::send(
        &app,
        "PUT",
        &format!("/api/entries/{}", apple_id),
        Some(&token),
        Some(json!({ "grams": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["nutrients"]["calories"], 112);
    assert_eq!(edited["date"], DAY);

    let (_, day) = common::send(&app, "GET", &day_uri, Some(&token), None).await;
    assert_eq!(day["rollup_total"], 331);

    let (status, deleted) = common::send(
        &app,
        "DELETE",
        &format!("/api/entries/{}", apple_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["day_total"], 219);

    let (_, deleted) = common::send(
        &app,
        "DELETE",
        &format!("/api/entries/{}", beef_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(deleted["day_total"], 0);

    // The rollup is kept at zero
    let (_, day) = common::send(&app, "GET", &day_uri, Some(&token), None).await;
    assert_eq!(day["rollup_total"], 0);
    assert!(day["entries"].as_array().unwrap().is_empty());
    assert!(day["alkaline_percent"].is_null());
}

#[tokio::test]
async fn test_day_view_totals_and_progress() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let (status, _) = common::send(
        &app,
        "PUT",
        "/api/settings",
        Some(&token),
        Some(json!({ "calories_goal": 400, "protein_goal": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (food, grams) in [("Maçã", 150), ("Patinho moído, grelhado", 100)] {
        common::send(
            &app,
            "POST",
            &format!("/api/days/{}/entries", DAY),
            Some(&token),
            Some(json!({ "food_name": food, "grams": grams, "time": "09:00" })),
        )
        .await;
    }

    let (_, day) = common::send(&app, "GET", &format!("/api/days/{}", DAY), Some(&token), None).await;

    // 150 g alkaline out of 250 g
    assert_eq!(day["alkaline_percent"], 60.0);

    let progress = day["progress"].as_array().unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0]["nutrient"], "calories");
    assert_eq!(progress[0]["percent"], 75.8);
    assert_eq!(progress[0]["status"], "under");
}

#[tokio::test]
async fn test_failed_rollup_write_is_rolled_back() {
    let (app, state, store) = common::create_test_app_with_store();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    store.set_fail_rollup_writes(true);
    let (status, body) = common::send(
        &app,
        "POST",
        &format!("/api/days/{}/entries", DAY),
        Some(&token),
        Some(json!({ "food_name": "Maçã" })),
    )
    .await;
    store.set_fail_rollup_writes(false);

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Storage details are logged, not returned
    assert!(body.get("details").is_none());

    let (_, day) = common::send(&app, "GET", &format!("/api/days/{}", DAY), Some(&token), None).await;
    assert!(day["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reconcile_repairs_drift() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);
    let date = chrono::NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();

    common::send(
        &app,
        "POST",
        &format!("/api/days/{}/entries", DAY),
        Some(&token),
        Some(json!({ "food_name": "Maçã", "grams": 150 })),
    )
    .await;

    // Knock the stored total out of step with the entries
    let rollups = state
        .store
        .list_rollups("user-1", YearMonth::of(date))
        .await
        .unwrap();
    state
        .store
        .update_rollup("user-1", &rollups[0].id, 1000)
        .await
        .unwrap();

    let (status, rollup) = common::send(
        &app,
        "POST",
        &format!("/api/days/{}/reconcile", DAY),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rollup["total_calories"], 84);
}

#[tokio::test]
async fn test_copy_entry_to_another_day() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let (_, entry) = common::send(
        &app,
        "POST",
        &format!("/api/days/{}/entries", DAY),
        Some(&token),
        Some(json!({ "food_name": "Maçã", "grams": 150 })),
    )
    .await;
    let entry_id = entry["id"].as_str().unwrap();

    let (status, copy) = common::send(
        &app,
        "POST",
        &format!("/api/entries/{}/copy", entry_id),
        Some(&token),
        Some(json!({ "date": "2024-02-06" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["date"], "2024-02-06");
    assert_eq!(copy["grams"], 150.0);

    // No body: same day
    let (status, copy) = common::send(
        &app,
        "POST",
        &format!("/api/entries/{}/copy", entry_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["date"], DAY);

    let (_, day) = common::send(&app, "GET", &format!("/api/days/{}", DAY), Some(&token), None).await;
    assert_eq!(day["rollup_total"], 168);
}

#[tokio::test]
async fn test_calendar_shows_rollup_totals() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    common::send(
        &app,
        "POST",
        &format!("/api/days/{}/entries", DAY),
        Some(&token),
        Some(json!({ "food_name": "Maçã", "grams": 150 })),
    )
    .await;

    let (status, calendar) =
        common::send(&app, "GET", "/api/calendar?month=2024-02", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar["month"], "2024-02");

    let cells = calendar["cells"].as_array().unwrap();
    assert_eq!(cells.len(), 42);
    // February 2024 starts on a Thursday; the grid starts on Sunday Jan 28
    assert_eq!(cells[0]["date"], "2024-01-28");
    assert_eq!(cells[0]["in_month"], false);

    let feb5 = cells.iter().find(|c| c["date"] == DAY).unwrap();
    assert_eq!(feb5["calories"], 84);
    assert_eq!(feb5["in_month"], true);
}

#[tokio::test]
async fn test_food_search_and_portion_preview() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &state.config.jwt_signing_key);

    let (status, results) =
        common::send(&app, "GET", "/api/foods/search?q=MACA", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let results = results.as_array().unwrap();
    assert!(!results.is_empty() && results.len() <= 5);
    assert!(results.iter().any(|f| f["name"] == "Maçã"));

    let (_, empty) = common::send(&app, "GET", "/api/foods/search?q=", Some(&token), None).await;
    assert!(empty.as_array().unwrap().is_empty());

    let (status, portion) = common::send(
        &app,
        "GET",
        "/api/foods/portion?name=Ma%C3%A7%C3%A3&grams=150",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(portion["name"], "Maçã");
    assert_eq!(portion["nutrients"]["calories"], 84);
    assert_eq!(portion["grams"], 150.0);
}
