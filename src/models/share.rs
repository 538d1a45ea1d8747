// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only shared-day snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Category, DayTotals, LoggedEntry, NutrientSnapshot};

/// Frozen copy of a day, readable by anyone holding the token.
///
/// Stored in `shared_days`, keyed by token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedDay {
    pub token: String,
    /// Owner; never exposed through the public endpoint.
    pub user_id: String,
    pub date: NaiveDate,
    pub entries: Vec<SharedEntry>,
    pub totals: DayTotals,
    pub alkaline_percent: Option<f64>,
    pub created_at: String,
}

/// Entry as it appears in a shared snapshot (no ids, no owner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedEntry {
    pub food_name: String,
    pub grams: f64,
    pub time: String,
    pub category: Category,
    pub nutrients: NutrientSnapshot,
    pub alkaline: bool,
}

impl From<&LoggedEntry> for SharedEntry {
    fn from(entry: &LoggedEntry) -> Self {
        Self {
            food_name: entry.food_name.clone(),
            grams: entry.grams,
            time: entry.time.clone(),
            category: entry.category,
            nutrients: entry.nutrients,
            alkaline: entry.alkaline,
        }
    }
}
