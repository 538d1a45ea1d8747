// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod entry;
pub mod food;
pub mod plan;
pub mod rollup;
pub mod settings;
pub mod share;
pub mod summary;

pub use entry::{LoggedEntry, NutrientSnapshot};
pub use food::{Category, FoodReference, NutrientsPer100g};
pub use plan::{MealPlanTemplate, MealType, PlannedItem};
pub use rollup::DailyRollup;
pub use settings::UserSettings;
pub use share::{SharedDay, SharedEntry};
pub use summary::{DayTotals, GoalProgress, ProgressStatus};
