// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only snapshots of a day, reachable by an unguessable token.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::db::NutritionStore;
use crate::error::{AppError, Result};
use crate::ids::new_share_token;
use crate::models::{DayTotals, SharedDay, SharedEntry};
use crate::time_utils::now_rfc3339;

pub struct ShareService {
    store: Arc<dyn NutritionStore>,
}

impl ShareService {
    pub fn new(store: Arc<dyn NutritionStore>) -> Self {
        Self { store }
    }

    /// Freeze the day's entries and totals under a new token.
    ///
    /// Later edits to the day do not reach the snapshot.
    pub async fn share_day(&self, user_id: &str, date: NaiveDate) -> Result<SharedDay> {
        let entries = self.store.list_entries(user_id, date).await?;
        let totals = DayTotals::from_entries(&entries);

        let shared = SharedDay {
            token: new_share_token()?,
            user_id: user_id.to_string(),
            date,
            entries: entries.iter().map(SharedEntry::from).collect(),
            alkaline_percent: totals.alkaline_percent(),
            totals,
            created_at: now_rfc3339(),
        };

        self.store.create_shared_day(&shared).await?;

        tracing::info!(
            user_id,
            date = %date,
            entries = shared.entries.len(),
            "Day shared"
        );

        Ok(shared)
    }

    pub async fn get_shared(&self, token: &str) -> Result<SharedDay> {
        self.store
            .get_shared_day(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Shared day".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::catalog::FoodCatalog;
    use crate::services::day_key::DayKeyPolicy;
    use crate::services::ledger::{DailyLedger, NewEntry};

    #[tokio::test]
    async fn test_snapshot_is_frozen() {
        let store: Arc<dyn NutritionStore> = Arc::new(MemoryStore::new());
        let catalog = Arc::new(FoodCatalog::builtin().unwrap());
        let ledger = DailyLedger::new(store.clone(), catalog, DayKeyPolicy::Current);
        let sharing = ShareService::new(store);
        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();

        let entry = ledger
            .add_entry(
                "u1",
                day,
                NewEntry {
                    food_name: "Maçã".to_string(),
                    grams: Some(150.0),
                    time: Some("08:15".to_string()),
                },
            )
            .await
            .unwrap();

        let shared = sharing.share_day("u1", day).await.unwrap();
        assert_eq!(shared.token.len(), 43);
        assert_eq!(shared.totals.calories, 84);
        assert_eq!(shared.alkaline_percent, Some(100.0));

        ledger.delete_entry("u1", &entry.id).await.unwrap();

        let fetched = sharing.get_shared(&shared.token).await.unwrap();
        assert_eq!(fetched.entries.len(), 1);
        assert_eq!(fetched.entries[0].food_name, "Maçã");
        assert_eq!(fetched.totals.calories, 84);
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let sharing = ShareService::new(Arc::new(MemoryStore::new()));
        let result = sharing.get_shared("nope").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
