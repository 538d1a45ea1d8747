// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User goal settings.

use chrono::{FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Daily nutrition goals for a user. A zero goal means "no goal".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSettings {
    #[serde(default)]
    pub calories_goal: u32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub protein_goal: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fat_goal: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub carbs_goal: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fiber_goal: f64,
    /// Offset from UTC used for "today" and entry times.
    #[serde(default)]
    #[validate(range(min = -720, max = 840))]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub updated_at: String,
}

impl UserSettings {
    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Current calendar day for this user.
    pub fn local_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }

    /// Current wall-clock time for this user.
    pub fn local_time(&self) -> NaiveTime {
        Utc::now().with_timezone(&self.offset()).time()
    }
}
