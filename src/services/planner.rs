// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal plan templates and their planned items.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::NutritionStore;
use crate::error::{AppError, Result};
use crate::models::{
    DayTotals, GoalProgress, LoggedEntry, MealPlanTemplate, MealType, PlannedItem,
};
use crate::services::catalog::FoodCatalog;
use crate::services::ledger::{DailyLedger, NewEntry};
use crate::services::portion;
use crate::time_utils::now_rfc3339;

pub const MAX_TEMPLATE_NAME_CHARS: usize = 100;

/// Item to add to a plan.
#[derive(Debug, Clone)]
pub struct NewPlannedItem {
    pub meal_type: MealType,
    pub food_name: String,
    pub grams: f64,
}

/// Planned items of one meal.
#[derive(Debug, Clone, Serialize)]
pub struct MealGroup {
    pub meal_type: MealType,
    pub items: Vec<PlannedItem>,
    pub totals: DayTotals,
}

/// A template with its items grouped by meal.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub template: MealPlanTemplate,
    pub meals: Vec<MealGroup>,
    pub totals: DayTotals,
    pub progress: Vec<GoalProgress>,
}

pub struct MealPlanner {
    store: Arc<dyn NutritionStore>,
    catalog: Arc<FoodCatalog>,
    ledger: Arc<DailyLedger>,
}

impl MealPlanner {
    pub fn new(
        store: Arc<dyn NutritionStore>,
        catalog: Arc<FoodCatalog>,
        ledger: Arc<DailyLedger>,
    ) -> Self {
        Self {
            store,
            catalog,
            ledger,
        }
    }

    // ─── Templates ───────────────────────────────────────────────────────────

    /// Create a template and make it the active one.
    pub async fn create_template(&self, user_id: &str, name: &str) -> Result<MealPlanTemplate> {
        let name = name.trim();
        let chars = name.chars().count();
        if chars == 0 || chars > MAX_TEMPLATE_NAME_CHARS {
            return Err(AppError::Validation(format!(
                "Plan name must be 1-{} characters",
                MAX_TEMPLATE_NAME_CHARS
            )));
        }

        let mut template = MealPlanTemplate {
            id: String::new(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            is_active: false,
            created_at: now_rfc3339(),
        };
        template.id = self.store.create_template(&template).await?;
        self.store
            .set_active_template(user_id, &template.id)
            .await?;
        template.is_active = true;

        tracing::info!(user_id, template_id = %template.id, "Meal plan created");
        Ok(template)
    }

    pub async fn list_templates(&self, user_id: &str) -> Result<Vec<MealPlanTemplate>> {
        self.store.list_templates(user_id).await
    }

    /// Delete a template and all of its items.
    pub async fn delete_template(&self, user_id: &str, template_id: &str) -> Result<()> {
        self.load_template(user_id, template_id).await?;
        self.store.delete_template(user_id, template_id).await?;
        tracing::info!(user_id, template_id, "Meal plan deleted");
        Ok(())
    }

    pub async fn activate(&self, user_id: &str, template_id: &str) -> Result<MealPlanTemplate> {
        let mut template = self.load_template(user_id, template_id).await?;
        self.store.set_active_template(user_id, template_id).await?;
        template.is_active = true;
        Ok(template)
    }

    // ─── Plan View ───────────────────────────────────────────────────────────

    pub async fn view_plan(&self, user_id: &str, template_id: &str) -> Result<PlanView> {
        let template = self.load_template(user_id, template_id).await?;
        self.build_view(user_id, template).await
    }

    /// View of the active template, if the user has one.
    pub async fn active_plan(&self, user_id: &str) -> Result<Option<PlanView>> {
        let active = self
            .store
            .list_templates(user_id)
            .await?
            .into_iter()
            .find(|t| t.is_active);

        match active {
            Some(template) => Ok(Some(self.build_view(user_id, template).await?)),
            None => Ok(None),
        }
    }

    async fn build_view(&self, user_id: &str, template: MealPlanTemplate) -> Result<PlanView> {
        let (items, settings) = futures_util::future::try_join(
            self.store.list_planned_items(user_id, &template.id),
            self.ledger.settings(user_id),
        )
        .await?;

        let mut totals = DayTotals::default();
        for item in &items {
            totals.add(&item.nutrients, item.grams, item.alkaline);
        }
        let totals = totals.rounded();

        let meals = MealType::ALL
            .iter()
            .map(|&meal_type| {
                let items: Vec<PlannedItem> = items
                    .iter()
                    .filter(|item| item.meal_type == meal_type)
                    .cloned()
                    .collect();
                let mut meal_totals = DayTotals::default();
                for item in &items {
                    meal_totals.add(&item.nutrients, item.grams, item.alkaline);
                }
                MealGroup {
                    meal_type,
                    items,
                    totals: meal_totals.rounded(),
                }
            })
            .collect();

        Ok(PlanView {
            progress: totals.progress(&settings),
            template,
            meals,
            totals,
        })
    }

    // ─── Planned Items ───────────────────────────────────────────────────────

    pub async fn add_item(
        &self,
        user_id: &str,
        template_id: &str,
        new: NewPlannedItem,
    ) -> Result<PlannedItem> {
        if !(new.grams.is_finite() && new.grams > 0.0) {
            return Err(AppError::Validation(
                "Grams must be greater than zero".to_string(),
            ));
        }
        portion::check_grams(Some(new.grams))?;
        self.load_template(user_id, template_id).await?;

        let food = self.catalog.find(&new.food_name)?;
        let portion = portion::compute(food, Some(new.grams));

        let mut item = PlannedItem {
            id: String::new(),
            user_id: user_id.to_string(),
            template_id: template_id.to_string(),
            meal_type: new.meal_type,
            food_name: food.name.clone(),
            grams: portion.grams,
            nutrients: portion.nutrients,
            alkaline: portion.alkaline,
        };
        item.id = self.store.create_planned_item(&item).await?;

        tracing::debug!(user_id, template_id, item_id = %item.id, "Planned item added");
        Ok(item)
    }

    pub async fn remove_item(&self, user_id: &str, template_id: &str, item_id: &str) -> Result<()> {
        self.load_item(user_id, template_id, item_id).await?;
        self.store.delete_planned_item(user_id, item_id).await
    }

    /// Log a planned item through the ledger on `date` (default: the user's
    /// local today).
    pub async fn log_item(
        &self,
        user_id: &str,
        template_id: &str,
        item_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<LoggedEntry> {
        let item = self.load_item(user_id, template_id, item_id).await?;
        let date = match date {
            Some(date) => date,
            None => self.ledger.settings(user_id).await?.local_today(),
        };

        self.ledger
            .add_entry(
                user_id,
                date,
                NewEntry {
                    food_name: item.food_name,
                    grams: Some(item.grams),
                    time: None,
                },
            )
            .await
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    async fn load_template(&self, user_id: &str, template_id: &str) -> Result<MealPlanTemplate> {
        self.store
            .get_template(user_id, template_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Meal plan {}", template_id)))
    }

    async fn load_item(
        &self,
        user_id: &str,
        template_id: &str,
        item_id: &str,
    ) -> Result<PlannedItem> {
        self.store
            .list_planned_items(user_id, template_id)
            .await?
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| AppError::NotFound(format!("Planned item {}", item_id)))
    }
}
