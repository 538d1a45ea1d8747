// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use nutri_tracker::error::AppError;
use nutri_tracker::services::CatalogError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_unknown_food_is_not_found() {
    let err = AppError::from(CatalogError::NotFound("Dragonfruit".to_string()));
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(body["details"].as_str().unwrap().contains("Dragonfruit"));
}

#[tokio::test]
async fn test_broken_catalog_is_internal() {
    let err = AppError::from(CatalogError::Parse("expected value".to_string()));
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_database_details_stay_private() {
    let err = AppError::Database("Failed to commit day change: deadline".to_string());
    let (status, body) = render(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_validation_carries_message() {
    let (status, body) = render(AppError::Validation("grams must be positive".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["details"], "grams must be positive");
}
