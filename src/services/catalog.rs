// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static food catalog: lookup by name and search.

use crate::models::FoodReference;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Catalog shipped with the binary.
const BUILTIN_FOODS: &str = include_str!("../../data/foods.json");

/// Maximum number of search results returned.
pub const SEARCH_LIMIT: usize = 5;

/// Read-only table of foods, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct FoodCatalog {
    foods: Vec<FoodReference>,
    by_name: HashMap<String, usize>,
}

impl FoodCatalog {
    /// Load the embedded catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::load_from_json(BUILTIN_FOODS)
    }

    /// Load a catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load a catalog from a JSON array of foods.
    ///
    /// Names must be unique; a duplicate is rejected rather than shadowed.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let foods: Vec<FoodReference> =
            serde_json::from_str(json_data).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let mut by_name = HashMap::with_capacity(foods.len());
        for (index, food) in foods.iter().enumerate() {
            if by_name.insert(food.name.clone(), index).is_some() {
                return Err(CatalogError::DuplicateName(food.name.clone()));
            }
        }

        tracing::info!(count = foods.len(), "Loaded food catalog");
        Ok(Self { foods, by_name })
    }

    /// All foods in catalog order.
    pub fn foods(&self) -> &[FoodReference] {
        &self.foods
    }

    /// Look up a food by its exact name.
    pub fn find(&self, name: &str) -> Result<&FoodReference, CatalogError> {
        self.by_name
            .get(name)
            .map(|&index| &self.foods[index])
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Case- and accent-insensitive search over names and categories.
    ///
    /// Returns at most [`SEARCH_LIMIT`] foods in catalog order.
    pub fn search(&self, query: &str) -> Vec<&FoodReference> {
        let needle = fold(query.trim());
        if needle.is_empty() {
            return Vec::new();
        }

        self.foods
            .iter()
            .filter(|food| {
                fold(&food.name).contains(&needle) || food.category.label().contains(&needle)
            })
            .take(SEARCH_LIMIT)
            .collect()
    }
}

/// Lowercase and strip the Portuguese diacritics used in food names.
fn fold(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Food not found: {0}")]
    NotFound(String),

    #[error("Failed to parse food catalog: {0}")]
    Parse(String),

    #[error("Duplicate food name in catalog: {0}")]
    DuplicateName(String),
}
