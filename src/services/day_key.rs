// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Day-key derivation and the per-month rollup index.
//!
//! The key is a weak hash over (day, month, year) that is only ever used to
//! index one month of rollups in memory. The rollup's `date` field stays
//! the source of truth, so lookups also compare dates.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::models::DailyRollup;

/// How a date maps to its rollup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayKeyPolicy {
    /// `day`. Collides across months.
    Legacy,
    /// `day + month + year`.
    #[default]
    Current,
}

impl FromStr for DayKeyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(DayKeyPolicy::Legacy),
            "current" => Ok(DayKeyPolicy::Current),
            _ => Err(ConfigError::Invalid("DAY_KEY_POLICY", s.to_string())),
        }
    }
}

impl DayKeyPolicy {
    /// Key for a (1-based month) calendar date.
    pub fn key(&self, day: u32, month: u32, year: i32) -> i32 {
        match self {
            DayKeyPolicy::Legacy => day as i32,
            DayKeyPolicy::Current => day as i32 + month as i32 + year,
        }
    }

    pub fn key_for(&self, date: NaiveDate) -> i32 {
        self.key(date.day(), date.month(), date.year())
    }
}

/// In-memory `day_key -> rollup` map for one viewed month.
#[derive(Debug, Clone, Default)]
pub struct DayIndex {
    policy: DayKeyPolicy,
    rollups: HashMap<i32, DailyRollup>,
}

impl DayIndex {
    /// Build an index from a month's rollups.
    ///
    /// If two rollups share a key (a collision or a duplicate record for the
    /// same day), the most recently updated one wins.
    pub fn build(policy: DayKeyPolicy, rollups: Vec<DailyRollup>) -> Self {
        let mut map: HashMap<i32, DailyRollup> = HashMap::with_capacity(rollups.len());
        for rollup in rollups {
            let key = policy.key_for(rollup.date);
            match map.get(&key) {
                Some(existing) if existing.updated_at >= rollup.updated_at => {
                    tracing::warn!(
                        day_key = key,
                        kept = %existing.date,
                        dropped = %rollup.date,
                        "Duplicate rollup for day key"
                    );
                }
                _ => {
                    map.insert(key, rollup);
                }
            }
        }

        Self {
            policy,
            rollups: map,
        }
    }

    /// Rollup for `date`, if one exists in this month's index.
    pub fn get(&self, date: NaiveDate) -> Option<&DailyRollup> {
        self.rollups
            .get(&self.policy.key_for(date))
            .filter(|rollup| rollup.date == date)
    }

    /// Calories recorded for `date`, zero when absent.
    pub fn calories_for(&self, date: NaiveDate) -> i64 {
        self.get(date).map(|r| r.total_calories).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.rollups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rollups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rollup(d: NaiveDate, total: i64) -> DailyRollup {
        DailyRollup {
            id: format!("r-{}", d),
            user_id: "u1".to_string(),
            date: d,
            day_key: DayKeyPolicy::Current.key_for(d),
            total_calories: total,
            updated_at: "2024-02-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_current_policy_sums_components() {
        assert_eq!(DayKeyPolicy::Current.key(5, 2, 2024), 2031);
        assert_eq!(DayKeyPolicy::Current.key_for(date(2024, 2, 5)), 2031);
    }

    #[test]
    fn test_legacy_policy_is_day_of_month() {
        assert_eq!(DayKeyPolicy::Legacy.key(5, 2, 2024), 5);
        assert_eq!(DayKeyPolicy::Legacy.key_for(date(2023, 11, 30)), 30);
    }

    #[test]
    fn test_key_is_deterministic() {
        let d = date(2024, 7, 19);
        assert_eq!(
            DayKeyPolicy::Current.key_for(d),
            DayKeyPolicy::Current.key_for(d)
        );
    }

    #[test]
    fn test_index_lookup_checks_date() {
        // Feb 1 and Jan 2 2024 share a key under the sum policy.
        let feb_1 = date(2024, 2, 1);
        let jan_2 = date(2024, 1, 2);
        assert_eq!(
            DayKeyPolicy::Current.key_for(feb_1),
            DayKeyPolicy::Current.key_for(jan_2)
        );

        let index = DayIndex::build(DayKeyPolicy::Current, vec![rollup(feb_1, 500)]);
        assert_eq!(index.calories_for(feb_1), 500);
        assert!(index.get(jan_2).is_none());
        assert_eq!(index.calories_for(jan_2), 0);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Legacy".parse::<DayKeyPolicy>().unwrap(), DayKeyPolicy::Legacy);
        assert!("packed".parse::<DayKeyPolicy>().is_err());
    }
}
