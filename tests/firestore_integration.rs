// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at the emulator.
//!
//! Every test uses its own user ID, so runs do not interfere.

use chrono::NaiveDate;
use nutri_tracker::db::{DayChange, EntryWrite, NutritionStore, RollupWrite};
use nutri_tracker::models::{
    Category, LoggedEntry, MealPlanTemplate, MealType, NutrientSnapshot, PlannedItem,
    UserSettings,
};
use nutri_tracker::time_utils::YearMonth;

mod common;
use common::test_db;

/// Generate a unique user ID for test isolation.
fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
}

fn apple_entry(user_id: &str, date: NaiveDate) -> LoggedEntry {
    LoggedEntry {
        id: String::new(),
        user_id: user_id.to_string(),
        food_name: "Maçã".to_string(),
        grams: 150.0,
        nutrients: NutrientSnapshot {
            calories: 84,
            protein: 0.5,
            fat: 0.3,
            carbs: 22.5,
            fiber: 3.0,
        },
        category: Category::Fruits,
        date,
        time: "08:00".to_string(),
        alkaline: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ENTRY TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_entry_crud() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let id = db.create_entry(&apple_entry(&user_id, day(5))).await.unwrap();
    assert!(!id.is_empty());

    let stored = db.get_entry(&user_id, &id).await.unwrap().unwrap();
    assert_eq!(stored.id, id);
    assert_eq!(stored.nutrients.calories, 84);
    assert_eq!(stored.date, day(5));

    // Entries of other users look absent
    assert!(db.get_entry("someone-else", &id).await.unwrap().is_none());

    let mut edited = stored.clone();
    edited.grams = 300.0;
    edited.nutrients.calories = 168;
    db.update_entry(&edited).await.unwrap();
    let stored = db.get_entry(&user_id, &id).await.unwrap().unwrap();
    assert_eq!(stored.nutrients.calories, 168);

    db.delete_entry(&user_id, &id).await.unwrap();
    assert!(db.get_entry(&user_id, &id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_entries_by_day() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let mut late = apple_entry(&user_id, day(5));
    late.time = "19:30".to_string();
    db.create_entry(&late).await.unwrap();
    db.create_entry(&apple_entry(&user_id, day(5))).await.unwrap();
    db.create_entry(&apple_entry(&user_id, day(6))).await.unwrap();

    let entries = db.list_entries(&user_id, day(5)).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].time, "08:00");
    assert_eq!(entries[1].time, "19:30");
}

// ═══════════════════════════════════════════════════════════════════════════
// ROLLUP TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_rollups_by_month() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let feb = db
        .create_rollup(&user_id, day(5), 2023, 84)
        .await
        .unwrap();
    db.create_rollup(&user_id, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 2024, 50)
        .await
        .unwrap();

    db.update_rollup(&user_id, &feb.id, 303).await.unwrap();

    let rollups = db
        .list_rollups(&user_id, YearMonth { year: 2024, month: 2 })
        .await
        .unwrap();
    assert_eq!(rollups.len(), 1);
    assert_eq!(rollups[0].date, day(5));
    assert_eq!(rollups[0].total_calories, 303);
}

#[tokio::test]
async fn test_day_change_commits_entry_and_rollup() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let created = db
        .apply_day_change(DayChange {
            user_id: user_id.clone(),
            entry: Some(EntryWrite::Create(apple_entry(&user_id, day(5)))),
            rollup: RollupWrite::Create {
                date: day(5),
                day_key: 2023,
                total_calories: 84,
            },
        })
        .await
        .unwrap();

    let entry = created.entry.unwrap();
    assert_eq!(created.rollup.total_calories, 84);

    let deleted = db
        .apply_day_change(DayChange {
            user_id: user_id.clone(),
            entry: Some(EntryWrite::Delete(entry.clone())),
            rollup: RollupWrite::Adjust {
                rollup_id: created.rollup.id.clone(),
                delta: -84,
            },
        })
        .await
        .unwrap();

    assert_eq!(deleted.rollup.total_calories, 0);
    assert!(db.get_entry(&user_id, &entry.id).await.unwrap().is_none());

    let stored = db
        .get_rollup(&user_id, &created.rollup.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_calories, 0);
}

#[tokio::test]
async fn test_concurrent_adjusts_are_not_lost() {
    require_emulator!();

    let db = test_db().await;
    let other = test_db().await;
    let user_id = unique_user_id();

    let rollup = db.create_rollup(&user_id, day(7), 2033, 100).await.unwrap();

    let adjust = |delta| DayChange {
        user_id: user_id.clone(),
        entry: None,
        rollup: RollupWrite::Adjust {
            rollup_id: rollup.id.clone(),
            delta,
        },
    };
    let (a, b) = tokio::join!(
        db.apply_day_change(adjust(10)),
        other.apply_day_change(adjust(25))
    );
    a.unwrap();
    b.unwrap();

    let stored = db.get_rollup(&user_id, &rollup.id).await.unwrap().unwrap();
    assert_eq!(stored.total_calories, 135);
}

#[tokio::test]
async fn test_create_on_existing_rollup_adds_delta() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    // Another writer created the day's rollup first
    let first = db.create_rollup(&user_id, day(8), 2034, 84).await.unwrap();

    let outcome = db
        .apply_day_change(DayChange {
            user_id: user_id.clone(),
            entry: Some(EntryWrite::Create(apple_entry(&user_id, day(8)))),
            rollup: RollupWrite::Create {
                date: day(8),
                day_key: 2034,
                total_calories: 84,
            },
        })
        .await
        .unwrap();

    assert_eq!(outcome.rollup.id, first.id);
    assert_eq!(outcome.rollup.total_calories, 168);
}

// ═══════════════════════════════════════════════════════════════════════════
// SETTINGS TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_settings_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    assert!(db.get_user_settings(&user_id).await.unwrap().is_none());

    let settings = UserSettings {
        calories_goal: 2000,
        protein_goal: 120.0,
        utc_offset_minutes: -180,
        ..Default::default()
    };
    db.save_user_settings(&user_id, &settings).await.unwrap();

    let stored = db.get_user_settings(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.calories_goal, 2000);
    assert_eq!(stored.utc_offset_minutes, -180);
}

// ═══════════════════════════════════════════════════════════════════════════
// MEAL PLAN TESTS
// ═══════════════════════════════════════════════════════════════════════════

fn template(user_id: &str, name: &str) -> MealPlanTemplate {
    MealPlanTemplate {
        id: String::new(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        is_active: false,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[tokio::test]
async fn test_templates_and_active_flag() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let first = db.create_template(&template(&user_id, "First")).await.unwrap();
    let second = db
        .create_template(&template(&user_id, "Second"))
        .await
        .unwrap();

    db.set_active_template(&user_id, &first).await.unwrap();
    db.set_active_template(&user_id, &second).await.unwrap();

    let templates = db.list_templates(&user_id).await.unwrap();
    assert_eq!(templates.len(), 2);
    let active: Vec<_> = templates.iter().filter(|t| t.is_active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second);
}

#[tokio::test]
async fn test_delete_template_removes_items() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    let template_id = db
        .create_template(&template(&user_id, "Weekday"))
        .await
        .unwrap();

    let item = PlannedItem {
        id: String::new(),
        user_id: user_id.clone(),
        template_id: template_id.clone(),
        meal_type: MealType::Breakfast,
        food_name: "Maçã".to_string(),
        grams: 150.0,
        nutrients: NutrientSnapshot {
            calories: 84,
            ..Default::default()
        },
        alkaline: true,
    };
    db.create_planned_item(&item).await.unwrap();
    db.create_planned_item(&item).await.unwrap();
    assert_eq!(
        db.list_planned_items(&user_id, &template_id)
            .await
            .unwrap()
            .len(),
        2
    );

    db.delete_template(&user_id, &template_id).await.unwrap();

    assert!(db
        .get_template(&user_id, &template_id)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .list_planned_items(&user_id, &template_id)
        .await
        .unwrap()
        .is_empty());
}
