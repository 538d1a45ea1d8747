// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily ledger: logged entries and the per-day calorie rollup.
//!
//! Every write changes one entry and moves the day's rollup by the same
//! calorie delta:
//! 1. Resolve the food and compute the portion snapshot
//! 2. Take the (user, day) lock
//! 3. Find the day's rollup through the month's `DayIndex`
//! 4. Hand the entry write and rollup write to the store as one `DayChange`

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::db::{DayChange, EntryWrite, NutritionStore, RollupWrite};
use crate::error::{AppError, Result};
use crate::models::{DailyRollup, DayTotals, GoalProgress, LoggedEntry, UserSettings};
use crate::services::calendar::{month_grid, CalendarMonth};
use crate::services::catalog::FoodCatalog;
use crate::services::day_key::{DayIndex, DayKeyPolicy};
use crate::services::portion;
use crate::time_utils::{format_hh_mm, now_rfc3339, parse_hh_mm, YearMonth};

/// Per-(user, day) write locks.
pub type DayLocks = Arc<DashMap<(String, NaiveDate), Arc<Mutex<()>>>>;

/// Held while a day is being written. On drop, the day's lock leaves the
/// map once no other writer holds or waits on it.
struct DayGuard {
    locks: DayLocks,
    key: (String, NaiveDate),
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for DayGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Food to log.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub food_name: String,
    pub grams: Option<f64>,
    /// `HH:MM`; the user's current local time when absent
    pub time: Option<String>,
}

/// Changes to an existing entry. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub food_name: Option<String>,
    pub grams: Option<f64>,
    pub time: Option<String>,
}

/// Everything shown for one day.
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub entries: Vec<LoggedEntry>,
    pub totals: DayTotals,
    pub alkaline_percent: Option<f64>,
    /// Stored rollup total, `None` before the first entry of the day
    pub rollup_total: Option<i64>,
    pub progress: Vec<GoalProgress>,
}

pub struct DailyLedger {
    store: Arc<dyn NutritionStore>,
    catalog: Arc<FoodCatalog>,
    policy: DayKeyPolicy,
    day_locks: DayLocks,
}

impl DailyLedger {
    pub fn new(
        store: Arc<dyn NutritionStore>,
        catalog: Arc<FoodCatalog>,
        policy: DayKeyPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            policy,
            day_locks: Arc::new(DashMap::new()),
        }
    }

    /// Stored settings, or defaults (no goals, UTC) for a new user.
    pub async fn settings(&self, user_id: &str) -> Result<UserSettings> {
        Ok(self
            .store
            .get_user_settings(user_id)
            .await?
            .unwrap_or_default())
    }

    // ─── Writes ──────────────────────────────────────────────────────────────

    /// Log a food on `date`.
    pub async fn add_entry(
        &self,
        user_id: &str,
        date: NaiveDate,
        new: NewEntry,
    ) -> Result<LoggedEntry> {
        portion::check_grams(new.grams)?;
        let food = self.catalog.find(&new.food_name)?;
        let portion = portion::compute(food, new.grams);
        let time = match new.time {
            Some(raw) => parse_hh_mm(&raw)?,
            None => format_hh_mm(self.settings(user_id).await?.local_time()),
        };

        let entry = LoggedEntry {
            id: String::new(),
            user_id: user_id.to_string(),
            food_name: food.name.clone(),
            grams: portion.grams,
            nutrients: portion.nutrients,
            category: portion.category,
            date,
            time,
            alkaline: portion.alkaline,
            created_at: now_rfc3339(),
        };
        let calories = entry.nutrients.calories;

        let _guard = self.lock_day(user_id, date).await;

        let rollup = self
            .rollup_write(user_id, date, calories, None, Some(&entry))
            .await?;
        let outcome = self
            .store
            .apply_day_change(DayChange {
                user_id: user_id.to_string(),
                entry: Some(EntryWrite::Create(entry)),
                rollup,
            })
            .await?;

        let entry = outcome
            .entry
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Store returned no entry")))?;

        tracing::info!(
            user_id,
            date = %date,
            entry_id = %entry.id,
            calories,
            day_total = outcome.rollup.total_calories,
            "Entry added"
        );

        Ok(entry)
    }

    /// Change the food, grams or time of an entry. The date is fixed.
    pub async fn edit_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        edit: EntryEdit,
    ) -> Result<LoggedEntry> {
        portion::check_grams(edit.grams)?;
        let date = self.load_entry(user_id, entry_id).await?.date;
        let _guard = self.lock_day(user_id, date).await;

        // Re-read under the lock; a concurrent write may have changed it
        let previous = self.load_entry(user_id, entry_id).await?;

        let food_name = edit
            .food_name
            .unwrap_or_else(|| previous.food_name.clone());
        let food = self.catalog.find(&food_name)?;
        let portion = portion::compute(food, edit.grams.or(Some(previous.grams)));
        let time = match edit.time {
            Some(raw) => parse_hh_mm(&raw)?,
            None => previous.time.clone(),
        };

        let next = LoggedEntry {
            food_name: food.name.clone(),
            grams: portion.grams,
            nutrients: portion.nutrients,
            category: portion.category,
            alkaline: portion.alkaline,
            time,
            ..previous.clone()
        };

        // Old calories come from the stored snapshot, not the catalog
        let delta = next.nutrients.calories - previous.nutrients.calories;

        let rollup = self
            .rollup_write(user_id, previous.date, delta, Some(&previous), Some(&next))
            .await?;
        let outcome = self
            .store
            .apply_day_change(DayChange {
                user_id: user_id.to_string(),
                entry: Some(EntryWrite::Update { previous, next }),
                rollup,
            })
            .await?;

        let entry = outcome
            .entry
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Store returned no entry")))?;

        tracing::info!(
            user_id,
            entry_id,
            delta,
            day_total = outcome.rollup.total_calories,
            "Entry edited"
        );

        Ok(entry)
    }

    /// Remove an entry. The day's rollup is kept even when it drops to zero.
    pub async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<DailyRollup> {
        let date = self.load_entry(user_id, entry_id).await?.date;
        let _guard = self.lock_day(user_id, date).await;

        let previous = self.load_entry(user_id, entry_id).await?;
        let delta = -previous.nutrients.calories;

        let rollup = self
            .rollup_write(user_id, previous.date, delta, Some(&previous), None)
            .await?;
        let outcome = self
            .store
            .apply_day_change(DayChange {
                user_id: user_id.to_string(),
                entry: Some(EntryWrite::Delete(previous)),
                rollup,
            })
            .await?;

        tracing::info!(
            user_id,
            entry_id,
            delta,
            day_total = outcome.rollup.total_calories,
            "Entry deleted"
        );

        Ok(outcome.rollup)
    }

    /// Log the same food and grams again on `target` (default: the same day)
    /// at the user's current local time.
    pub async fn copy_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        target: Option<NaiveDate>,
    ) -> Result<LoggedEntry> {
        let source = self.load_entry(user_id, entry_id).await?;
        let date = target.unwrap_or(source.date);

        self.add_entry(
            user_id,
            date,
            NewEntry {
                food_name: source.food_name,
                grams: Some(source.grams),
                time: None,
            },
        )
        .await
    }

    /// Recompute a day's rollup from its entries and store it.
    pub async fn reconcile_day(&self, user_id: &str, date: NaiveDate) -> Result<DailyRollup> {
        let _guard = self.lock_day(user_id, date).await;

        let entries = self.store.list_entries(user_id, date).await?;
        let total: i64 = entries.iter().map(|e| e.nutrients.calories).sum();

        let rollup = match self.find_rollup(user_id, date).await? {
            Some(existing) if existing.total_calories == total => return Ok(existing),
            Some(existing) => {
                tracing::warn!(
                    user_id,
                    date = %date,
                    stored = existing.total_calories,
                    actual = total,
                    "Rollup drift repaired"
                );
                RollupWrite::Set {
                    rollup_id: existing.id,
                    total_calories: total,
                }
            }
            None => RollupWrite::Create {
                date,
                day_key: self.policy.key_for(date),
                total_calories: total,
            },
        };

        let outcome = self
            .store
            .apply_day_change(DayChange {
                user_id: user_id.to_string(),
                entry: None,
                rollup,
            })
            .await?;

        Ok(outcome.rollup)
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// Entries, totals and goal progress for one day.
    pub async fn view_day(&self, user_id: &str, date: NaiveDate) -> Result<DayView> {
        let (entries, settings, rollup) = futures_util::future::try_join3(
            self.store.list_entries(user_id, date),
            self.settings(user_id),
            self.find_rollup(user_id, date),
        )
        .await?;

        let totals = DayTotals::from_entries(&entries);

        Ok(DayView {
            date,
            alkaline_percent: totals.alkaline_percent(),
            progress: totals.progress(&settings),
            rollup_total: rollup.map(|r| r.total_calories),
            entries,
            totals,
        })
    }

    /// Rollup index for one month.
    pub async fn load_month(&self, user_id: &str, month: YearMonth) -> Result<DayIndex> {
        let rollups = self.store.list_rollups(user_id, month).await?;
        Ok(DayIndex::build(self.policy, rollups))
    }

    /// Calendar grid for `month` (default: the user's current month).
    pub async fn calendar(&self, user_id: &str, month: Option<YearMonth>) -> Result<CalendarMonth> {
        let today = self.settings(user_id).await?.local_today();
        let month = month.unwrap_or_else(|| YearMonth::of(today));
        let index = self.load_month(user_id, month).await?;
        Ok(month_grid(month, &index, today))
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    async fn lock_day(&self, user_id: &str, date: NaiveDate) -> DayGuard {
        let key = (user_id.to_string(), date);
        let lock = self
            .day_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        DayGuard {
            locks: self.day_locks.clone(),
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn load_entry(&self, user_id: &str, entry_id: &str) -> Result<LoggedEntry> {
        self.store
            .get_entry(user_id, entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entry {}", entry_id)))
    }

    async fn find_rollup(&self, user_id: &str, date: NaiveDate) -> Result<Option<DailyRollup>> {
        let index = self.load_month(user_id, YearMonth::of(date)).await?;
        Ok(index.get(date).cloned())
    }

    /// Rollup half of a write that moves the day's total by `delta`.
    ///
    /// A missing rollup is created from the day's entries as they will be
    /// after the write, which is just the new entry on an empty day.
    async fn rollup_write(
        &self,
        user_id: &str,
        date: NaiveDate,
        delta: i64,
        removed: Option<&LoggedEntry>,
        added: Option<&LoggedEntry>,
    ) -> Result<RollupWrite> {
        if let Some(rollup) = self.find_rollup(user_id, date).await? {
            return Ok(RollupWrite::Adjust {
                rollup_id: rollup.id,
                delta,
            });
        }

        let existing: i64 = self
            .store
            .list_entries(user_id, date)
            .await?
            .iter()
            .filter(|e| removed.map_or(true, |r| r.id != e.id))
            .map(|e| e.nutrients.calories)
            .sum();
        let added = added.map_or(0, |e| e.nutrients.calories);

        Ok(RollupWrite::Create {
            date,
            day_key: self.policy.key_for(date),
            total_calories: existing + added,
        })
    }
}
