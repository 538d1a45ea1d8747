// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing and formatting.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time as stored in `created_at`/`updated_at` fields.
pub fn now_rfc3339() -> String {
    format_utc_rfc3339(Utc::now())
}

/// Years accepted from clients. Keeps grid arithmetic inside chrono's range.
pub const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .filter(|date| YEARS.contains(&date.year()))
        .ok_or_else(|| AppError::Validation(format!("Invalid date '{}': expected YYYY-MM-DD", raw)))
}

/// Format a wall-clock time as "HH:MM".
pub fn format_hh_mm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Validate an "HH:MM" entry time.
pub fn parse_hh_mm(raw: &str) -> Result<String, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map(format_hh_mm)
        .map_err(|_| AppError::Validation(format!("Invalid time '{}': expected HH:MM", raw)))
}

/// A calendar month, formatted as "YYYY-MM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse "YYYY-MM".
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        parse_date(&format!("{}-01", raw))
            .map(Self::of)
            .map_err(|_| AppError::Validation(format!("Invalid month '{}': expected YYYY-MM", raw)))
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
