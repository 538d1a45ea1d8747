// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static food reference model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Food grouping used for search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Category {
    #[serde(rename = "fats")]
    Fats,
    #[serde(rename = "proteins")]
    Proteins,
    #[serde(rename = "carbs (high)")]
    CarbsHigh,
    #[serde(rename = "carbs (low)")]
    CarbsLow,
    #[serde(rename = "leaves")]
    Leaves,
    #[serde(rename = "fruits")]
    Fruits,
    #[serde(rename = "dairy")]
    Dairy,
}

impl Category {
    /// Label as stored in the catalog and matched by search.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Fats => "fats",
            Category::Proteins => "proteins",
            Category::CarbsHigh => "carbs (high)",
            Category::CarbsLow => "carbs (low)",
            Category::Leaves => "leaves",
            Category::Fruits => "fruits",
            Category::Dairy => "dairy",
        }
    }
}

/// Nutrients for a 100 g portion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutrientsPer100g {
    /// kcal
    pub calories: u32,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub fiber: f64,
}

/// A catalog entry. The name is the lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FoodReference {
    pub name: String,
    #[serde(flatten)]
    pub nutrients: NutrientsPer100g,
    pub category: Category,
    pub alkaline: bool,
}
