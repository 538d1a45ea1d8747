// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Portion calculator: scales per-100 g nutrients to a gram amount.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::models::{Category, FoodReference, NutrientSnapshot};

/// Grams used when the requested amount is missing or not positive.
pub const DEFAULT_GRAMS: f64 = 100.0;

/// Largest portion accepted for logging or planning (10 kg).
pub const MAX_GRAMS: f64 = 10_000.0;

/// A scaled portion of a catalog food.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Portion {
    /// Grams actually used for scaling
    pub grams: f64,
    pub nutrients: NutrientSnapshot,
    pub category: Category,
    pub alkaline: bool,
}

/// Round to one decimal place, half away from zero.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Grams after default substitution: anything that is not a positive,
/// finite number becomes [`DEFAULT_GRAMS`].
pub fn effective_grams(grams: Option<f64>) -> f64 {
    match grams {
        Some(g) if g.is_finite() && g > 0.0 => g,
        _ => DEFAULT_GRAMS,
    }
}

/// Reject an amount above [`MAX_GRAMS`]. Amounts that fall back to the
/// default pass.
pub fn check_grams(grams: Option<f64>) -> Result<(), AppError> {
    match grams {
        Some(g) if g.is_finite() && g > MAX_GRAMS => Err(AppError::Validation(format!(
            "grams must be at most {}",
            MAX_GRAMS
        ))),
        _ => Ok(()),
    }
}

/// Scale a food's nutrients to `grams`.
///
/// Calories round to the nearest integer; macros to one decimal.
pub fn compute(food: &FoodReference, grams: Option<f64>) -> Portion {
    let grams = effective_grams(grams);
    let multiplier = grams / 100.0;
    let base = &food.nutrients;

    Portion {
        grams,
        nutrients: NutrientSnapshot {
            calories: (base.calories as f64 * multiplier).round() as i64,
            protein: round_tenth(base.protein * multiplier),
            fat: round_tenth(base.fat * multiplier),
            carbs: round_tenth(base.carbs * multiplier),
            fiber: round_tenth(base.fiber * multiplier),
        },
        category: food.category,
        alkaline: food.alkaline,
    }
}
