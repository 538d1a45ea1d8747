// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer.
//!
//! [`NutritionStore`] is the contract the ledger and services need from
//! storage. [`FirestoreDb`] is the production backend; [`MemoryStore`]
//! keeps everything in process for local development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppError;
use crate::models::{
    DailyRollup, LoggedEntry, MealPlanTemplate, PlannedItem, SharedDay, UserSettings,
};
use crate::time_utils::YearMonth;

/// Collection names as constants.
pub mod collections {
    pub const ENTRIES: &str = "food_entries";
    /// Per-day calorie totals
    pub const ROLLUPS: &str = "daily_rollups";
    /// Goal settings (keyed by user_id)
    pub const SETTINGS: &str = "user_settings";
    /// Shared-day snapshots (keyed by token)
    pub const SHARED_DAYS: &str = "shared_days";
    pub const TEMPLATES: &str = "meal_plan_templates";
    pub const PLANNED_ITEMS: &str = "planned_items";
}

/// Entry half of a [`DayChange`].
#[derive(Debug, Clone)]
pub enum EntryWrite {
    /// Store a new entry; its `id` is assigned by the store.
    Create(LoggedEntry),
    /// Replace `previous` with `next` (same id).
    Update {
        previous: LoggedEntry,
        next: LoggedEntry,
    },
    Delete(LoggedEntry),
}

impl EntryWrite {
    /// Calorie change this write makes to its day.
    pub fn calorie_delta(&self) -> i64 {
        match self {
            EntryWrite::Create(entry) => entry.nutrients.calories,
            EntryWrite::Update { previous, next } => {
                next.nutrients.calories - previous.nutrients.calories
            }
            EntryWrite::Delete(entry) => -entry.nutrients.calories,
        }
    }
}

/// Rollup half of a [`DayChange`].
#[derive(Debug, Clone)]
pub enum RollupWrite {
    /// First write for a day.
    Create {
        date: NaiveDate,
        day_key: i32,
        total_calories: i64,
    },
    /// Add `delta` to the stored total.
    Adjust { rollup_id: String, delta: i64 },
    /// Overwrite the stored total (reconciliation).
    Set {
        rollup_id: String,
        total_calories: i64,
    },
}

/// An entry write and the rollup write that keeps the day's total in step.
#[derive(Debug, Clone)]
pub struct DayChange {
    pub user_id: String,
    pub entry: Option<EntryWrite>,
    pub rollup: RollupWrite,
}

/// Result of a committed [`DayChange`].
#[derive(Debug, Clone)]
pub struct DayChangeOutcome {
    /// Stored entry after a create or update
    pub entry: Option<LoggedEntry>,
    pub rollup: DailyRollup,
}

/// Storage operations for entries, rollups, settings, shares and plans.
///
/// Lookups are scoped by user: a record owned by another user is reported
/// as absent.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    // ─── Entries ─────────────────────────────────────────────────

    /// Store a new entry and return its assigned ID.
    async fn create_entry(&self, entry: &LoggedEntry) -> Result<String, AppError>;

    async fn get_entry(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<Option<LoggedEntry>, AppError>;

    /// Create or replace the entry with `entry.id`.
    async fn update_entry(&self, entry: &LoggedEntry) -> Result<(), AppError>;

    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<(), AppError>;

    /// All entries for one calendar day.
    async fn list_entries(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<LoggedEntry>, AppError>;

    // ─── Rollups ─────────────────────────────────────────────────

    async fn create_rollup(
        &self,
        user_id: &str,
        date: NaiveDate,
        day_key: i32,
        total_calories: i64,
    ) -> Result<DailyRollup, AppError>;

    async fn get_rollup(
        &self,
        user_id: &str,
        rollup_id: &str,
    ) -> Result<Option<DailyRollup>, AppError>;

    async fn update_rollup(
        &self,
        user_id: &str,
        rollup_id: &str,
        total_calories: i64,
    ) -> Result<(), AppError>;

    /// All rollups whose date falls in `month`.
    async fn list_rollups(
        &self,
        user_id: &str,
        month: YearMonth,
    ) -> Result<Vec<DailyRollup>, AppError>;

    // ─── Settings ────────────────────────────────────────────────

    async fn get_user_settings(&self, user_id: &str) -> Result<Option<UserSettings>, AppError>;

    async fn save_user_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), AppError>;

    // ─── Shared Days ─────────────────────────────────────────────

    async fn create_shared_day(&self, shared: &SharedDay) -> Result<(), AppError>;

    async fn get_shared_day(&self, token: &str) -> Result<Option<SharedDay>, AppError>;

    // ─── Meal Plans ──────────────────────────────────────────────

    /// Store a new template and return its assigned ID.
    async fn create_template(&self, template: &MealPlanTemplate) -> Result<String, AppError>;

    async fn list_templates(&self, user_id: &str) -> Result<Vec<MealPlanTemplate>, AppError>;

    async fn get_template(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Option<MealPlanTemplate>, AppError>;

    /// Delete a template together with its planned items.
    async fn delete_template(&self, user_id: &str, template_id: &str) -> Result<(), AppError>;

    /// Mark one template active and every other template of the user inactive.
    async fn set_active_template(&self, user_id: &str, template_id: &str)
        -> Result<(), AppError>;

    /// Store a new planned item and return its assigned ID.
    async fn create_planned_item(&self, item: &PlannedItem) -> Result<String, AppError>;

    async fn list_planned_items(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Vec<PlannedItem>, AppError>;

    async fn delete_planned_item(&self, user_id: &str, item_id: &str) -> Result<(), AppError>;

    // ─── Atomic Day Changes ──────────────────────────────────────

    /// Apply an entry write and its rollup write as one logical unit.
    ///
    /// The default implementation writes the entry first and the rollup
    /// second. If the rollup write fails, the entry write is undone before
    /// the error is returned. Backends with transactions should override
    /// this with a single commit.
    async fn apply_day_change(&self, change: DayChange) -> Result<DayChangeOutcome, AppError> {
        let applied = match change.entry {
            Some(write) => Some(apply_entry_write(self, write).await?),
            None => None,
        };

        match apply_rollup_write(self, &change.user_id, change.rollup).await {
            Ok(rollup) => Ok(DayChangeOutcome {
                entry: applied.and_then(AppliedEntry::into_stored),
                rollup,
            }),
            Err(err) => {
                if let Some(applied) = applied {
                    compensate_entry_write(self, applied).await;
                }
                Err(err)
            }
        }
    }
}

/// Entry write that has reached storage and may need undoing.
enum AppliedEntry {
    Created(LoggedEntry),
    Updated {
        previous: LoggedEntry,
        next: LoggedEntry,
    },
    Deleted(LoggedEntry),
}

impl AppliedEntry {
    fn into_stored(self) -> Option<LoggedEntry> {
        match self {
            AppliedEntry::Created(entry) => Some(entry),
            AppliedEntry::Updated { next, .. } => Some(next),
            AppliedEntry::Deleted(_) => None,
        }
    }
}

async fn apply_entry_write<S>(store: &S, write: EntryWrite) -> Result<AppliedEntry, AppError>
where
    S: NutritionStore + ?Sized,
{
    match write {
        EntryWrite::Create(mut entry) => {
            entry.id = store.create_entry(&entry).await?;
            Ok(AppliedEntry::Created(entry))
        }
        EntryWrite::Update { previous, next } => {
            store.update_entry(&next).await?;
            Ok(AppliedEntry::Updated { previous, next })
        }
        EntryWrite::Delete(entry) => {
            store.delete_entry(&entry.user_id, &entry.id).await?;
            Ok(AppliedEntry::Deleted(entry))
        }
    }
}

async fn apply_rollup_write<S>(
    store: &S,
    user_id: &str,
    write: RollupWrite,
) -> Result<DailyRollup, AppError>
where
    S: NutritionStore + ?Sized,
{
    let (rollup_id, total_calories) = match write {
        RollupWrite::Create {
            date,
            day_key,
            total_calories,
        } => {
            return store
                .create_rollup(user_id, date, day_key, total_calories)
                .await;
        }
        RollupWrite::Set {
            rollup_id,
            total_calories,
        } => (rollup_id, total_calories),
        RollupWrite::Adjust { rollup_id, delta } => {
            let current = store
                .get_rollup(user_id, &rollup_id)
                .await?
                .ok_or_else(|| AppError::Database(format!("Rollup {} vanished", rollup_id)))?;
            (rollup_id, current.total_calories + delta)
        }
    };

    store
        .update_rollup(user_id, &rollup_id, total_calories)
        .await?;

    store
        .get_rollup(user_id, &rollup_id)
        .await?
        .ok_or_else(|| AppError::Database(format!("Rollup {} vanished", rollup_id)))
}

/// Undo an entry write after its rollup write failed.
///
/// A failure here leaves the rollup out of step with the entries; it is
/// logged so the day can be reconciled.
async fn compensate_entry_write<S>(store: &S, applied: AppliedEntry)
where
    S: NutritionStore + ?Sized,
{
    let (user_id, entry_id, result) = match &applied {
        AppliedEntry::Created(entry) => (
            &entry.user_id,
            &entry.id,
            store.delete_entry(&entry.user_id, &entry.id).await,
        ),
        AppliedEntry::Updated { previous, .. } | AppliedEntry::Deleted(previous) => (
            &previous.user_id,
            &previous.id,
            store.update_entry(previous).await,
        ),
    };

    match result {
        Ok(()) => tracing::warn!(
            user_id = %user_id,
            entry_id = %entry_id,
            "Rollup write failed; entry write rolled back"
        ),
        Err(e) => tracing::error!(
            user_id = %user_id,
            entry_id = %entry_id,
            error = %e,
            "Rollup write failed and entry rollback failed; day needs reconciliation"
        ),
    }
}
