// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-day calorie rollups used for calendar coloring.
//!
//! Rollups are maintained incrementally by the ledger, so a monthly
//! calendar costs one query instead of a scan over every entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Total calories for one (user, day).
///
/// Stored in `daily_rollups`. The `date` field is authoritative; `day_key`
/// is a local lookup convenience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRollup {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub day_key: i32,
    /// Signed so that drift below zero is still representable.
    pub total_calories: i64,
    #[serde(default)]
    pub updated_at: String,
}
