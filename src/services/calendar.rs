// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly calendar grid with per-day calorie totals.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::services::day_key::DayIndex;
use crate::time_utils::YearMonth;

/// Six weeks of seven days.
pub const GRID_CELLS: usize = 42;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarCell {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: NaiveDate,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub calories: i64,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarMonth {
    pub month: String,
    pub title: String,
    pub cells: Vec<CalendarCell>,
}

/// Build the Sunday-first grid for `month`.
///
/// Leading and trailing cells belong to the neighbouring months and always
/// show zero calories, since `index` only covers `month`.
pub fn month_grid(month: YearMonth, index: &DayIndex, today: NaiveDate) -> CalendarMonth {
    let first = month.first_day();
    let leading = first.weekday().num_days_from_sunday() as i64;
    let start = first - Duration::days(leading);

    let cells = (0..GRID_CELLS as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let in_month = month.contains(date);
            CalendarCell {
                date,
                day: date.day(),
                in_month,
                is_today: in_month && date == today,
                calories: if in_month { index.calories_for(date) } else { 0 },
            }
        })
        .collect();

    CalendarMonth {
        month: month.to_string(),
        title: format!("{} {}", MONTH_NAMES[(month.month - 1) as usize], month.year),
        cells,
    }
}
