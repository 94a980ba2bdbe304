//! Configuration utilities for the recognition pipeline.
//!
//! This module provides the error type and validation trait used by
//! configuration structures, the common builder configuration shared by the
//! classifier builder, and the ONNX Runtime session configuration.

use crate::core::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_SESSION_POOL_SIZE, MAX_IMAGE_DIMENSION,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a batch size is invalid (must be greater than 0).
    #[error("batch size must be greater than 0")]
    InvalidBatchSize,

    /// Error indicating that a model path does not exist.
    #[error("model path does not exist: {}", path.display())]
    ModelPathNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// A message describing the invalid configuration.
        message: String,
    },

    /// Error indicating that validation failed.
    #[error("validation failed: {message}")]
    ValidationFailed {
        /// A message describing the failure.
        message: String,
    },
}

/// A trait for validating configuration parameters.
///
/// Types implementing this trait validate their own fields and expose a
/// default configuration. The provided methods cover the field checks shared
/// by the pipeline's configuration structures.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a usize value is positive.
    fn validate_positive_usize(&self, value: usize, field_name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0", field_name),
            });
        }
        Ok(())
    }

    /// Validates that a model path exists and is a file.
    fn validate_model_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ModelPathNotFound {
                path: path.to_path_buf(),
            });
        }

        if !path.is_file() {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "model path must be a file, not a directory: {}",
                    path.display()
                ),
            });
        }

        Ok(())
    }

    /// Validates image dimensions against the accepted range.
    fn validate_image_dimensions(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("image dimensions must be greater than 0, got {width}x{height}"),
            });
        }
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "image dimensions must not exceed {MAX_IMAGE_DIMENSION}, got {width}x{height}"
                ),
            });
        }
        Ok(())
    }
}

/// Extension methods for validators used at classifier build time.
pub trait ConfigValidatorExt: ConfigValidator {
    /// Validates the configuration, converting any failure into a
    /// [`RecognitionError`](crate::core::RecognitionError).
    fn validate_and_wrap(self) -> Result<Self, crate::core::RecognitionError>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}

/// Graph optimization levels accepted by the session configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OrtGraphOptimizationLevel {
    /// Disable all graph optimizations.
    DisableAll,
    /// Basic optimizations.
    Level1,
    /// Extended optimizations.
    Level2,
    /// Layout and extended optimizations.
    Level3,
    /// All available optimizations.
    All,
}

/// Execution providers that can be requested for a session.
///
/// Non-CPU providers require the corresponding cargo feature; requesting one
/// without the feature enabled fails at session build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrtExecutionProvider {
    /// CPU execution provider, always available.
    CPU,
    /// NVIDIA CUDA execution provider.
    CUDA {
        /// Device ordinal to run on.
        device_id: Option<i32>,
    },
    /// NVIDIA TensorRT execution provider.
    TensorRT {
        /// Device ordinal to run on.
        device_id: Option<i32>,
    },
    /// DirectML execution provider (Windows).
    DirectML {
        /// Device ordinal to run on.
        device_id: Option<i32>,
    },
    /// CoreML execution provider (macOS).
    CoreML,
}

/// ONNX Runtime session configuration.
///
/// Controls thread counts, graph optimization, and execution providers for
/// the pooled inference sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of intra-op threads.
    pub intra_threads: Option<usize>,
    /// Number of inter-op threads.
    pub inter_threads: Option<usize>,
    /// Whether to enable parallel execution of graph nodes.
    pub parallel_execution: Option<bool>,
    /// Graph optimization level.
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference.
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Creates an empty session configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallel_execution(mut self, parallel: bool) -> Self {
        self.parallel_execution = Some(parallel);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Sets the execution providers in order of preference.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }
}

/// Common configuration options shared by classifier builders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonBuilderConfig {
    /// Path to the model artifact.
    pub model_path: Option<PathBuf>,
    /// Name of the model, used in logs and error context.
    pub model_name: Option<String>,
    /// Number of images per inference batch.
    pub batch_size: Option<usize>,
    /// Number of pooled sessions for concurrent predictions.
    pub session_pool_size: Option<usize>,
    /// Name of the model's input tensor; auto-detected when absent.
    pub input_name: Option<String>,
    /// ONNX Runtime session configuration.
    pub ort_session: Option<OrtSessionConfig>,
}

impl CommonBuilderConfig {
    /// Creates an empty common configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a common configuration with a model name and batch size filled in.
    pub fn with_defaults(model_name: Option<String>, batch_size: Option<usize>) -> Self {
        Self {
            model_path: None,
            model_name,
            batch_size,
            session_pool_size: Some(DEFAULT_SESSION_POOL_SIZE),
            input_name: None,
            ort_session: None,
        }
    }

    /// Sets the model path.
    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(model_path.into());
        self
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets the session pool size (minimum 1).
    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = Some(size);
        self
    }

    /// Sets the input tensor name, skipping auto-detection.
    pub fn input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = Some(name.into());
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }
}

impl ConfigValidator for CommonBuilderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err(ConfigError::InvalidBatchSize);
            }
        }

        if let Some(pool_size) = self.session_pool_size {
            self.validate_positive_usize(pool_size, "session_pool_size")?;
        }

        if let Some(path) = &self.model_path {
            self.validate_model_path(path)?;
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::with_defaults(None, Some(DEFAULT_BATCH_SIZE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_batch_size_rejected() {
        let config = CommonBuilderConfig::new().batch_size(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchSize)
        ));
    }

    #[test]
    fn missing_model_path_rejected() {
        let config = CommonBuilderConfig::new().model_path("definitely/not/here.onnx");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ModelPathNotFound { .. })
        ));
    }

    #[test]
    fn defaults_validate() {
        assert!(CommonBuilderConfig::get_defaults().validate().is_ok());
    }

    #[test]
    fn dimension_bounds() {
        let config = CommonBuilderConfig::new();
        assert!(config.validate_image_dimensions(224, 224).is_ok());
        assert!(config.validate_image_dimensions(0, 224).is_err());
        assert!(
            config
                .validate_image_dimensions(MAX_IMAGE_DIMENSION + 1, 224)
                .is_err()
        );
    }
}
