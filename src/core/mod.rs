//! The core module of the recognition pipeline.
//!
//! This module contains the fundamental components of the pipeline, including:
//! - Configuration management and validation
//! - Constants used throughout the pipeline
//! - Error handling
//! - Inference engine integration
//! - Versioned label configuration
//! - Tensor type aliases
//! - Traits defining the pipeline's seams
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod labels;
pub mod tensor;
pub mod traits;

pub use crate::utils::{load_image, load_images_batch};
pub use config::{
    CommonBuilderConfig, ConfigError, ConfigValidator, ConfigValidatorExt, OrtSessionConfig,
};
pub use constants::*;
pub use errors::{ProcessingStage, RecognitionError};
pub use inference::{DefaultImageReader, OrtInfer};
pub use labels::LabelSet;
pub use tensor::{Tensor2D, Tensor4D};
pub use traits::{ImageReader, ScoringModel};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
