// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local store for development and tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use crate::db::NutritionStore;
use crate::error::AppError;
use crate::ids::new_document_id;
use crate::models::{
    DailyRollup, LoggedEntry, MealPlanTemplate, PlannedItem, SharedDay, UserSettings,
};
use crate::time_utils::{now_rfc3339, YearMonth};

/// In-memory [`NutritionStore`].
///
/// Uses the trait's default (compensating) `apply_day_change`.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, LoggedEntry>,
    rollups: DashMap<String, DailyRollup>,
    settings: DashMap<String, UserSettings>,
    shared_days: DashMap<String, SharedDay>,
    templates: DashMap<String, MealPlanTemplate>,
    planned_items: DashMap<String, PlannedItem>,
    fail_rollup_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every rollup write fail until switched off again.
    pub fn set_fail_rollup_writes(&self, fail: bool) {
        self.fail_rollup_writes.store(fail, Ordering::SeqCst);
    }

    fn check_rollup_write(&self) -> Result<(), AppError> {
        if self.fail_rollup_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database("Injected rollup write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NutritionStore for MemoryStore {
    async fn create_entry(&self, entry: &LoggedEntry) -> Result<String, AppError> {
        let mut entry = entry.clone();
        entry.id = new_document_id()?;
        let id = entry.id.clone();
        self.entries.insert(id.clone(), entry);
        Ok(id)
    }

    async fn get_entry(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<Option<LoggedEntry>, AppError> {
        Ok(self
            .entries
            .get(entry_id)
            .filter(|e| e.user_id == user_id)
            .map(|e| e.value().clone()))
    }

    async fn update_entry(&self, entry: &LoggedEntry) -> Result<(), AppError> {
        self.entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<(), AppError> {
        self.entries
            .remove_if(entry_id, |_, e| e.user_id == user_id);
        Ok(())
    }

    async fn list_entries(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<LoggedEntry>, AppError> {
        let mut entries: Vec<LoggedEntry> = self
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.date == date)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| a.time.cmp(&b.time).then(a.created_at.cmp(&b.created_at)));
        Ok(entries)
    }

    async fn create_rollup(
        &self,
        user_id: &str,
        date: NaiveDate,
        day_key: i32,
        total_calories: i64,
    ) -> Result<DailyRollup, AppError> {
        self.check_rollup_write()?;
        let rollup = DailyRollup {
            id: new_document_id()?,
            user_id: user_id.to_string(),
            date,
            day_key,
            total_calories,
            updated_at: now_rfc3339(),
        };
        self.rollups.insert(rollup.id.clone(), rollup.clone());
        Ok(rollup)
    }

    async fn get_rollup(
        &self,
        user_id: &str,
        rollup_id: &str,
    ) -> Result<Option<DailyRollup>, AppError> {
        Ok(self
            .rollups
            .get(rollup_id)
            .filter(|r| r.user_id == user_id)
            .map(|r| r.value().clone()))
    }

    async fn update_rollup(
        &self,
        user_id: &str,
        rollup_id: &str,
        total_calories: i64,
    ) -> Result<(), AppError> {
        self.check_rollup_write()?;
        let mut rollup = self
            .rollups
            .get_mut(rollup_id)
            .filter(|r| r.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Rollup {}", rollup_id)))?;
        rollup.total_calories = total_calories;
        rollup.updated_at = now_rfc3339();
        Ok(())
    }

    async fn list_rollups(
        &self,
        user_id: &str,
        month: YearMonth,
    ) -> Result<Vec<DailyRollup>, AppError> {
        Ok(self
            .rollups
            .iter()
            .filter(|r| r.user_id == user_id && month.contains(r.date))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn get_user_settings(&self, user_id: &str) -> Result<Option<UserSettings>, AppError> {
        Ok(self.settings.get(user_id).map(|s| s.value().clone()))
    }

    async fn save_user_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), AppError> {
        self.settings.insert(user_id.to_string(), settings.clone());
        Ok(())
    }

    async fn create_shared_day(&self, shared: &SharedDay) -> Result<(), AppError> {
        self.shared_days
            .insert(shared.token.clone(), shared.clone());
        Ok(())
    }

    async fn get_shared_day(&self, token: &str) -> Result<Option<SharedDay>, AppError> {
        Ok(self.shared_days.get(token).map(|s| s.value().clone()))
    }

    async fn create_template(&self, template: &MealPlanTemplate) -> Result<String, AppError> {
        let mut template = template.clone();
        template.id = new_document_id()?;
        let id = template.id.clone();
        self.templates.insert(id.clone(), template);
        Ok(id)
    }

    async fn list_templates(&self, user_id: &str) -> Result<Vec<MealPlanTemplate>, AppError> {
        let mut templates: Vec<MealPlanTemplate> = self
            .templates
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.value().clone())
            .collect();
        templates.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(templates)
    }

    async fn get_template(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Option<MealPlanTemplate>, AppError> {
        Ok(self
            .templates
            .get(template_id)
            .filter(|t| t.user_id == user_id)
            .map(|t| t.value().clone()))
    }

    async fn delete_template(&self, user_id: &str, template_id: &str) -> Result<(), AppError> {
        if self
            .templates
            .remove_if(template_id, |_, t| t.user_id == user_id)
            .is_some()
        {
            self.planned_items
                .retain(|_, item| item.template_id != template_id);
        }
        Ok(())
    }

    async fn set_active_template(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<(), AppError> {
        for mut template in self.templates.iter_mut() {
            if template.user_id == user_id {
                template.is_active = template.id == template_id;
            }
        }
        Ok(())
    }

    async fn create_planned_item(&self, item: &PlannedItem) -> Result<String, AppError> {
        let mut item = item.clone();
        item.id = new_document_id()?;
        let id = item.id.clone();
        self.planned_items.insert(id.clone(), item);
        Ok(id)
    }

    async fn list_planned_items(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Vec<PlannedItem>, AppError> {
        Ok(self
            .planned_items
            .iter()
            .filter(|i| i.user_id == user_id && i.template_id == template_id)
            .map(|i| i.value().clone())
            .collect())
    }

    async fn delete_planned_item(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        self.planned_items
            .remove_if(item_id, |_, i| i.user_id == user_id);
        Ok(())
    }
}
