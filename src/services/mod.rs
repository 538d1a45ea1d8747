// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod calendar;
pub mod catalog;
pub mod day_key;
pub mod ledger;
pub mod planner;
pub mod portion;
pub mod sharing;

pub use catalog::{CatalogError, FoodCatalog};
pub use day_key::{DayIndex, DayKeyPolicy};
pub use ledger::{DailyLedger, DayView, EntryEdit, NewEntry};
pub use planner::{MealPlanner, NewPlannedItem, PlanView};
pub use sharing::ShareService;
