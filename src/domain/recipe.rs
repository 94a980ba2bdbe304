//! Recipe records and lookup.
//!
//! The classifier produces a label; the recipe store maps that label to the
//! metadata shown to the user. A lookup miss is not an error: the store
//! answers with a fixed "Unknown" record instead, so callers never branch on
//! a missing recipe.

use crate::core::RecognitionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Recipe metadata for one dish, keyed by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    /// Dish name, matching a classifier label exactly.
    pub name: String,
    /// Ingredient list.
    pub ingredients: String,
    /// Preparation steps.
    pub recipe_steps: String,
    /// Calorie estimate.
    pub calories: String,
    /// Nutrient summary.
    pub nutrients: String,
}

impl RecipeRecord {
    /// The fallback record returned for labels with no stored recipe.
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            ingredients: "N/A".to_string(),
            recipe_steps: "N/A".to_string(),
            calories: "N/A".to_string(),
            nutrients: "N/A".to_string(),
        }
    }
}

/// Trait for recipe lookup keyed by exact dish name.
pub trait RecipeStore {
    /// Fetches the recipe for the given name, or the
    /// [`RecipeRecord::unknown`] fallback when no recipe matches.
    fn fetch(&self, name: &str) -> RecipeRecord;
}

/// An in-memory recipe store backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeStore {
    records: HashMap<String, RecipeRecord>,
}

impl InMemoryRecipeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from a list of records.
    pub fn from_records(records: Vec<RecipeRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();
        Self { records }
    }

    /// Loads a store from a JSON file holding an array of records.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RecognitionError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let records: Vec<RecipeRecord> = serde_json::from_str(&contents).map_err(|e| {
            RecognitionError::config_error(format!(
                "failed to parse recipe file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(Self::from_records(records))
    }

    /// Inserts or replaces a record, keyed by its name.
    pub fn insert(&mut self, record: RecipeRecord) {
        self.records.insert(record.name.clone(), record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecipeStore for InMemoryRecipeStore {
    fn fetch(&self, name: &str) -> RecipeRecord {
        self.records
            .get(name)
            .cloned()
            .unwrap_or_else(RecipeRecord::unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pizza() -> RecipeRecord {
        RecipeRecord {
            name: "pizza".to_string(),
            ingredients: "dough, tomato, mozzarella".to_string(),
            recipe_steps: "stretch, top, bake".to_string(),
            calories: "266 kcal per slice".to_string(),
            nutrients: "carbs, fat, protein".to_string(),
        }
    }

    #[test]
    fn fetch_hit_returns_stored_record() {
        let store = InMemoryRecipeStore::from_records(vec![pizza()]);
        assert_eq!(store.fetch("pizza"), pizza());
    }

    #[test]
    fn fetch_miss_returns_exact_fallback() {
        let store = InMemoryRecipeStore::new();
        let record = store.fetch("croissant");
        assert_eq!(record.name, "Unknown");
        assert_eq!(record.ingredients, "N/A");
        assert_eq!(record.recipe_steps, "N/A");
        assert_eq!(record.calories, "N/A");
        assert_eq!(record.nutrients, "N/A");
    }

    #[test]
    fn lookup_is_exact_match() {
        let store = InMemoryRecipeStore::from_records(vec![pizza()]);
        assert_eq!(store.fetch("Pizza").name, "Unknown");
    }

    #[test]
    fn from_json_file_loads_records() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Idli", "ingredients": "rice, urad dal",
                 "recipe_steps": "soak, grind, ferment, steam",
                 "calories": "39 kcal each", "nutrients": "carbs, protein"}}]"#
        )
        .unwrap();

        let store = InMemoryRecipeStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.fetch("Idli").calories, "39 kcal each");
    }
}
