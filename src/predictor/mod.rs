//! Predictor implementations.
//!
//! This module contains the recipe classifier, which chains preprocessing,
//! inference, and top-class selection into one prediction service. The
//! module holds both the predictor and its builder.

pub mod recipe_classifier;

pub use recipe_classifier::{
    RecipeClassifier, RecipeClassifierBuilder, RecipeClassifierConfig, RecipePrediction,
};
