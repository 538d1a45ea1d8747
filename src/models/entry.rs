// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logged food entry model for storage and API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Category;

/// Nutrients of one concrete portion, frozen at write time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutrientSnapshot {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub calories: i64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
}

/// Stored food entry in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoggedEntry {
    /// Document ID (assigned by the store)
    #[serde(default)]
    pub id: String,
    /// Owning account
    pub user_id: String,
    /// Catalog name of the food
    pub food_name: String,
    /// Effective grams used for the snapshot
    pub grams: f64,
    /// Nutrient snapshot for `grams`
    pub nutrients: NutrientSnapshot,
    pub category: Category,
    /// Calendar day in the user's local time
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    /// "HH:MM", display only
    pub time: String,
    /// Copied from the catalog at creation
    pub alkaline: bool,
    /// When this entry was first written (RFC3339)
    pub created_at: String,
}
