//! Domain types consumed by serving layers.
//!
//! The prediction pipeline ends at a label and a confidence; these types
//! cover what callers do next: look up recipe metadata for the label and
//! record the prediction in a per-user history.

pub mod history;
pub mod recipe;

pub use history::{HistoryEntry, PredictionHistory};
pub use recipe::{InMemoryRecipeStore, RecipeRecord, RecipeStore};
