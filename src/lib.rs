//! # Recipe Vision
//!
//! A Rust library that classifies food photos into recipe categories using
//! ONNX models, and maps the predicted label to recipe metadata.
//!
//! ## Features
//!
//! - Prediction pipeline from photo file to label + confidence
//! - Stretch-resize and unit-range normalization matching the trained model
//! - ONNX Runtime integration with a pooled session for concurrent predictions
//! - Versioned label sets shipped alongside the model artifact
//! - Recipe lookup with a fixed fallback for unknown dishes
//! - Per-user prediction history for serving layers
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, inference engine, labels, traits
//! * [`domain`] - Recipe records, lookup, and prediction history
//! * [`predictor`] - The recipe classifier and its builder
//! * [`processors`] - Resizing, normalization, and score selection
//! * [`utils`] - Image loading utilities
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recipe_vision::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load the model once at startup; a load failure is fatal.
//! let classifier = RecipeClassifierBuilder::new()
//!     .session_pool_size(2)
//!     .build(Path::new("models/recipe_recognizer.onnx"))?;
//!
//! // Classify an uploaded photo.
//! let prediction = classifier.classify(Path::new("uploads/lunch.jpg"))?;
//! println!(
//!     "{} ({:.2}%)",
//!     prediction.label,
//!     prediction.confidence_percent()
//! );
//!
//! // Look up recipe metadata for the predicted label.
//! let store = InMemoryRecipeStore::from_json_file("models/recipes.json")?;
//! let recipe = store.fetch(&prediction.label);
//! println!("{}: {}", recipe.name, recipe.ingredients);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use recipe_vision::prelude::*;
/// ```
pub mod prelude {
    // Classification (essential)
    pub use crate::predictor::{
        RecipeClassifier, RecipeClassifierBuilder, RecipeClassifierConfig, RecipePrediction,
    };

    // Labels and lookup
    pub use crate::core::LabelSet;
    pub use crate::domain::{
        HistoryEntry, InMemoryRecipeStore, PredictionHistory, RecipeRecord, RecipeStore,
    };

    // Error handling (essential)
    pub use crate::core::RecognitionError;

    // Image utility (minimal)
    pub use crate::utils::{load_image, load_images_batch};
}
