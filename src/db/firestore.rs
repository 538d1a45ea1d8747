// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Entries (logged foods)
//! - Rollups (per-day calorie totals)
//! - Settings, shared days and meal plans

use async_trait::async_trait;
use chrono::NaiveDate;
use firestore::errors::BackoffError;
use firestore::FirestoreTransaction;
use futures_util::FutureExt;

use crate::db::{collections, DayChange, DayChangeOutcome, EntryWrite, NutritionStore, RollupWrite};
use crate::error::AppError;
use crate::ids::new_document_id;
use crate::models::{
    DailyRollup, LoggedEntry, MealPlanTemplate, PlannedItem, SharedDay, UserSettings,
};
use crate::time_utils::{now_rfc3339, YearMonth};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Rollup document ID: one document per user per day.
fn rollup_doc_id(user_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", urlencoding::encode(user_id), date)
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Fetch a document by ID.
    async fn get_doc<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a document.
    async fn put_doc<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, doc_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All documents in `collection` owned by `user_id`.
    async fn list_for_user<T>(&self, collection: &str, user_id: &str) -> Result<Vec<T>, AppError>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl NutritionStore for FirestoreDb {
    // ─── Entry Operations ────────────────────────────────────────

    async fn create_entry(&self, entry: &LoggedEntry) -> Result<String, AppError> {
        let mut entry = entry.clone();
        entry.id = new_document_id()?;
        self.put_doc(collections::ENTRIES, &entry.id, &entry).await?;
        Ok(entry.id)
    }

    async fn get_entry(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<Option<LoggedEntry>, AppError> {
        let entry: Option<LoggedEntry> = self.get_doc(collections::ENTRIES, entry_id).await?;
        Ok(entry.filter(|e| e.user_id == user_id))
    }

    async fn update_entry(&self, entry: &LoggedEntry) -> Result<(), AppError> {
        self.put_doc(collections::ENTRIES, &entry.id, entry).await
    }

    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<(), AppError> {
        if self.get_entry(user_id, entry_id).await?.is_none() {
            return Ok(());
        }
        self.delete_doc(collections::ENTRIES, entry_id).await
    }

    async fn list_entries(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<LoggedEntry>, AppError> {
        let user_id = user_id.to_string();
        let date = date.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::ENTRIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("date").eq(date.clone()),
                ])
            })
            .order_by([("time", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Rollup Operations ───────────────────────────────────────

    async fn create_rollup(
        &self,
        user_id: &str,
        date: NaiveDate,
        day_key: i32,
        total_calories: i64,
    ) -> Result<DailyRollup, AppError> {
        let rollup = DailyRollup {
            id: rollup_doc_id(user_id, date),
            user_id: user_id.to_string(),
            date,
            day_key,
            total_calories,
            updated_at: now_rfc3339(),
        };
        self.put_doc(collections::ROLLUPS, &rollup.id, &rollup)
            .await?;
        Ok(rollup)
    }

    async fn get_rollup(
        &self,
        user_id: &str,
        rollup_id: &str,
    ) -> Result<Option<DailyRollup>, AppError> {
        let rollup: Option<DailyRollup> = self.get_doc(collections::ROLLUPS, rollup_id).await?;
        Ok(rollup.filter(|r| r.user_id == user_id))
    }

    async fn update_rollup(
        &self,
        user_id: &str,
        rollup_id: &str,
        total_calories: i64,
    ) -> Result<(), AppError> {
        let mut rollup = self
            .get_rollup(user_id, rollup_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rollup {}", rollup_id)))?;
        rollup.total_calories = total_calories;
        rollup.updated_at = now_rfc3339();
        self.put_doc(collections::ROLLUPS, rollup_id, &rollup).await
    }

    async fn list_rollups(
        &self,
        user_id: &str,
        month: YearMonth,
    ) -> Result<Vec<DailyRollup>, AppError> {
        let user_id = user_id.to_string();
        let first = month.first_day().to_string();
        let last = month.last_day().to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROLLUPS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("date").greater_than_or_equal(first.clone()),
                    q.field("date").less_than_or_equal(last.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Settings Operations ─────────────────────────────────────

    async fn get_user_settings(&self, user_id: &str) -> Result<Option<UserSettings>, AppError> {
        self.get_doc(collections::SETTINGS, user_id).await
    }

    async fn save_user_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), AppError> {
        self.put_doc(collections::SETTINGS, user_id, settings).await
    }

    // ─── Shared Day Operations ───────────────────────────────────

    async fn create_shared_day(&self, shared: &SharedDay) -> Result<(), AppError> {
        self.put_doc(collections::SHARED_DAYS, &shared.token, shared)
            .await
    }

    async fn get_shared_day(&self, token: &str) -> Result<Option<SharedDay>, AppError> {
        self.get_doc(collections::SHARED_DAYS, token).await
    }

    // ─── Meal Plan Operations ────────────────────────────────────

    async fn create_template(&self, template: &MealPlanTemplate) -> Result<String, AppError> {
        let mut template = template.clone();
        template.id = new_document_id()?;
        self.put_doc(collections::TEMPLATES, &template.id, &template)
            .await?;
        Ok(template.id)
    }

    async fn list_templates(&self, user_id: &str) -> Result<Vec<MealPlanTemplate>, AppError> {
        let mut templates: Vec<MealPlanTemplate> =
            self.list_for_user(collections::TEMPLATES, user_id).await?;
        templates.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(templates)
    }

    async fn get_template(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Option<MealPlanTemplate>, AppError> {
        let template: Option<MealPlanTemplate> =
            self.get_doc(collections::TEMPLATES, template_id).await?;
        Ok(template.filter(|t| t.user_id == user_id))
    }

    async fn delete_template(&self, user_id: &str, template_id: &str) -> Result<(), AppError> {
        if self.get_template(user_id, template_id).await?.is_none() {
            return Ok(());
        }

        let items = self.list_planned_items(user_id, template_id).await?;
        let count = items.len();
        self.batch_delete(&items, collections::PLANNED_ITEMS, |item: &PlannedItem| {
            item.id.clone()
        })
        .await?;

        self.delete_doc(collections::TEMPLATES, template_id).await?;

        tracing::debug!(user_id, template_id, count, "Deleted template and items");
        Ok(())
    }

    async fn set_active_template(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let templates = self.list_templates(user_id).await?;

        for chunk in templates.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for template in chunk {
                let mut template = template.clone();
                template.is_active = template.id == template_id;
                client
                    .fluent()
                    .update()
                    .in_col(collections::TEMPLATES)
                    .document_id(&template.id)
                    .object(&template)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add template to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit active template: {}", e))
            })?;
        }

        Ok(())
    }

    async fn create_planned_item(&self, item: &PlannedItem) -> Result<String, AppError> {
        let mut item = item.clone();
        item.id = new_document_id()?;
        self.put_doc(collections::PLANNED_ITEMS, &item.id, &item)
            .await?;
        Ok(item.id)
    }

    async fn list_planned_items(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Vec<PlannedItem>, AppError> {
        let user_id = user_id.to_string();
        let template_id = template_id.to_string();

        self.get_client()?
            .fluent()
            .select()
            .from(collections::PLANNED_ITEMS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("template_id").eq(template_id.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_planned_item(&self, user_id: &str, item_id: &str) -> Result<(), AppError> {
        let item: Option<PlannedItem> = self.get_doc(collections::PLANNED_ITEMS, item_id).await?;
        match item {
            Some(item) if item.user_id == user_id => {
                self.delete_doc(collections::PLANNED_ITEMS, item_id).await
            }
            _ => Ok(()),
        }
    }

    // ─── Atomic Day Changes ──────────────────────────────────────

    /// Commit an entry write and its rollup write in one transaction.
    ///
    /// The rollup is read inside the transaction, so a concurrent commit
    /// to the same day makes Firestore retry this one.
    async fn apply_day_change(&self, change: DayChange) -> Result<DayChangeOutcome, AppError> {
        let client = self.get_client()?;
        let user_id = change.user_id.clone();

        let outcome = client
            .run_transaction(|db, transaction| {
                let change = change.clone();
                async move {
                    stage_day_change(&db, transaction, change)
                        .await
                        .map_err(BackoffError::permanent)
                }
                .boxed()
            })
            .await
            .map_err(|e| AppError::Database(format!("Day change transaction failed: {}", e)))?;

        tracing::debug!(
            user_id = %user_id,
            date = %outcome.rollup.date,
            total_calories = outcome.rollup.total_calories,
            "Day change committed"
        );

        Ok(outcome)
    }
}

/// Read the day's rollup and queue both writes on `transaction`.
///
/// Reads go through `db`, which is bound to the transaction.
async fn stage_day_change(
    db: &firestore::FirestoreDb,
    transaction: &mut FirestoreTransaction<'_>,
    change: DayChange,
) -> Result<DayChangeOutcome, AppError> {
    let user_id = change.user_id;
    let now = now_rfc3339();
    let delta = change.entry.as_ref().map_or(0, EntryWrite::calorie_delta);

    // 1. Resolve the rollup document as it will look after the commit
    let rollup_id = match &change.rollup {
        RollupWrite::Create { date, .. } => rollup_doc_id(&user_id, *date),
        RollupWrite::Adjust { rollup_id, .. } | RollupWrite::Set { rollup_id, .. } => {
            rollup_id.clone()
        }
    };
    let stored: Option<DailyRollup> = db
        .fluent()
        .select()
        .by_id_in(collections::ROLLUPS)
        .obj()
        .one(&rollup_id)
        .await
        .map_err(|e| AppError::Database(format!("Failed to read rollup in transaction: {}", e)))?;
    let stored = stored.filter(|r| r.user_id == user_id);

    let rollup = match (change.rollup, stored) {
        // Another writer created the day first: apply our change on top
        (RollupWrite::Create { total_calories, .. }, Some(mut existing)) => {
            existing.total_calories = if change.entry.is_some() {
                existing.total_calories + delta
            } else {
                total_calories
            };
            existing.updated_at = now.clone();
            existing
        }
        (
            RollupWrite::Create {
                date,
                day_key,
                total_calories,
            },
            None,
        ) => DailyRollup {
            id: rollup_id,
            user_id: user_id.clone(),
            date,
            day_key,
            total_calories,
            updated_at: now.clone(),
        },
        (RollupWrite::Adjust { delta, .. }, Some(mut existing)) => {
            existing.total_calories += delta;
            existing.updated_at = now.clone();
            existing
        }
        (RollupWrite::Set { total_calories, .. }, Some(mut existing)) => {
            existing.total_calories = total_calories;
            existing.updated_at = now.clone();
            existing
        }
        (_, None) => {
            return Err(AppError::Database(format!("Rollup {} vanished", rollup_id)));
        }
    };

    // 2. Add the entry write
    let stored_entry = match change.entry {
        Some(EntryWrite::Create(mut entry)) => {
            entry.id = new_document_id()?;
            db.fluent()
                .update()
                .in_col(collections::ENTRIES)
                .document_id(&entry.id)
                .object(&entry)
                .add_to_transaction(transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add entry to transaction: {}", e))
                })?;
            Some(entry)
        }
        Some(EntryWrite::Update { next, .. }) => {
            db.fluent()
                .update()
                .in_col(collections::ENTRIES)
                .document_id(&next.id)
                .object(&next)
                .add_to_transaction(transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add entry to transaction: {}", e))
                })?;
            Some(next)
        }
        Some(EntryWrite::Delete(entry)) => {
            db.fluent()
                .delete()
                .from(collections::ENTRIES)
                .document_id(&entry.id)
                .add_to_transaction(transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add entry deletion to transaction: {}",
                        e
                    ))
                })?;
            None
        }
        None => None,
    };

    // 3. Add the rollup write
    db.fluent()
        .update()
        .in_col(collections::ROLLUPS)
        .document_id(&rollup.id)
        .object(&rollup)
        .add_to_transaction(transaction)
        .map_err(|e| AppError::Database(format!("Failed to add rollup to transaction: {}", e)))?;

    Ok(DayChangeOutcome {
        entry: stored_entry,
        rollup,
    })
}
