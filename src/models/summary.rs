// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Running totals over a set of portions and progress against goals.
//!
//! Totals are always recomputed by a full scan of the day's entries. Only
//! calories are tracked incrementally (see [`crate::models::DailyRollup`]).

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{LoggedEntry, NutrientSnapshot, UserSettings};
use crate::services::portion::round_tenth;

/// Progress is "near" the goal from this percentage on.
const NEAR_GOAL_PERCENT: f64 = 80.0;

/// Summed nutrients for a day (or a meal plan).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DayTotals {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub calories: i64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
    pub total_grams: f64,
    pub alkaline_grams: f64,
}

impl DayTotals {
    /// Add one portion to the running totals.
    pub fn add(&mut self, nutrients: &NutrientSnapshot, grams: f64, alkaline: bool) {
        self.calories = self.calories.saturating_add(nutrients.calories);
        self.protein += nutrients.protein;
        self.fat += nutrients.fat;
        self.carbs += nutrients.carbs;
        self.fiber += nutrients.fiber;
        self.total_grams += grams;
        if alkaline {
            self.alkaline_grams += grams;
        }
    }

    /// Round the macro sums to one decimal place for display.
    pub fn rounded(self) -> Self {
        Self {
            protein: round_tenth(self.protein),
            fat: round_tenth(self.fat),
            carbs: round_tenth(self.carbs),
            fiber: round_tenth(self.fiber),
            ..self
        }
    }

    /// Full scan over a day's entries.
    pub fn from_entries(entries: &[LoggedEntry]) -> Self {
        let mut totals = Self::default();
        for entry in entries {
            totals.add(&entry.nutrients, entry.grams, entry.alkaline);
        }
        totals.rounded()
    }

    /// Share of alkaline grams, one decimal. `None` when nothing was eaten.
    pub fn alkaline_percent(&self) -> Option<f64> {
        if self.total_grams > 0.0 {
            Some(round_tenth(self.alkaline_grams / self.total_grams * 100.0))
        } else {
            None
        }
    }

    /// Progress against every non-zero goal.
    pub fn progress(&self, settings: &UserSettings) -> Vec<GoalProgress> {
        [
            ("calories", self.calories as f64, settings.calories_goal as f64),
            ("protein", self.protein, settings.protein_goal),
            ("fat", self.fat, settings.fat_goal),
            ("carbs", self.carbs, settings.carbs_goal),
            ("fiber", self.fiber, settings.fiber_goal),
        ]
        .into_iter()
        .filter_map(|(nutrient, current, goal)| GoalProgress::new(nutrient, current, goal))
        .collect()
    }
}

/// Where a total stands relative to its goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ProgressStatus {
    Under,
    Near,
    Over,
}

/// Progress toward one nutrient goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GoalProgress {
    pub nutrient: String,
    pub current: f64,
    pub goal: f64,
    /// Capped at 100
    pub percent: f64,
    pub status: ProgressStatus,
}

impl GoalProgress {
    /// Returns `None` for a zero (unset) goal.
    pub fn new(nutrient: &str, current: f64, goal: f64) -> Option<Self> {
        if goal <= 0.0 {
            return None;
        }

        let raw = current / goal * 100.0;
        let status = if raw < NEAR_GOAL_PERCENT {
            ProgressStatus::Under
        } else if raw < 100.0 {
            ProgressStatus::Near
        } else {
            ProgressStatus::Over
        };

        Some(Self {
            nutrient: nutrient.to_string(),
            current,
            goal,
            percent: round_tenth(raw.min(100.0)),
            status,
        })
    }
}
