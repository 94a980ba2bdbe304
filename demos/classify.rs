//! Recipe Classification Example
//!
//! This example classifies food photos into recipe categories and prints the
//! predicted dish with its confidence, plus recipe metadata when a recipe
//! store is provided.
//!
//! Usage:
//! ```
//! cargo run --example classify -- --model-path <path_to_model> <image_paths>...
//! ```
//!
//! With a label file and recipe store:
//! ```
//! cargo run --example classify -- --model-path model.onnx \
//!     --label-path labels.json --recipe-path recipes.json dinner.jpg
//! ```

use clap::Parser;
use recipe_vision::core::init_tracing;
use recipe_vision::domain::{InMemoryRecipeStore, RecipeStore};
use recipe_vision::predictor::RecipeClassifierBuilder;
use std::path::Path;
use tracing::{error, info};

/// Command-line arguments for the recipe classification example
#[derive(Parser)]
#[command(name = "classify")]
#[command(about = "Recipe Classification Example - classifies food photos into dishes")]
struct Args {
    /// Path to the ONNX model file
    #[arg(short, long)]
    model_path: String,

    /// Path to a versioned label set JSON file; the built-in recipe labels
    /// are used when omitted
    #[arg(short, long)]
    label_path: Option<String>,

    /// Path to a recipe store JSON file
    #[arg(short, long)]
    recipe_path: Option<String>,

    /// Number of pooled sessions for concurrent predictions
    #[arg(long, default_value_t = 1)]
    session_pool_size: usize,

    /// Number of candidate dishes to list per photo
    #[arg(short, long, default_value_t = 1)]
    topk: usize,

    /// Image file paths to classify
    #[arg(required = true)]
    images: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();

    let mut builder = RecipeClassifierBuilder::new().session_pool_size(args.session_pool_size);
    if let Some(label_path) = &args.label_path {
        builder = builder.labels_from_file(label_path)?;
    }

    // Model loading is fatal: without a model there is nothing to serve.
    let classifier = builder.build(Path::new(&args.model_path))?;
    info!(
        labels = classifier.labels().len(),
        version = classifier.labels().version(),
        "classifier ready"
    );

    let store = match &args.recipe_path {
        Some(path) => Some(InMemoryRecipeStore::from_json_file(path)?),
        None => None,
    };

    for image_path in &args.images {
        match classifier.classify(Path::new(image_path)) {
            Ok(prediction) => {
                info!(
                    "{}: {} ({:.2}%)",
                    image_path,
                    prediction.label,
                    prediction.confidence_percent()
                );
                if args.topk > 1 {
                    let img = recipe_vision::utils::load_image(Path::new(image_path))?;
                    for candidate in classifier.top_candidates(&img, args.topk)? {
                        info!(
                            "   candidate: {} ({:.2}%)",
                            candidate.label,
                            candidate.confidence_percent()
                        );
                    }
                }
                if let Some(store) = &store {
                    let recipe = store.fetch(&prediction.label);
                    info!("   ingredients: {}", recipe.ingredients);
                    info!("   steps: {}", recipe.recipe_steps);
                    info!("   calories: {}", recipe.calories);
                    info!("   nutrients: {}", recipe.nutrients);
                }
            }
            Err(e) => {
                // Per-image failures abort only that image.
                error!("{}: classification failed: {}", image_path, e);
            }
        }
    }

    Ok(())
}
