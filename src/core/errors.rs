//! Error types for the recipe recognition pipeline.
//!
//! This module defines the errors that can occur while decoding images,
//! preprocessing them, loading the classification model, and running
//! inference. It also provides utility constructors for creating these
//! errors with appropriate context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Enum representing different stages of processing in the recognition pipeline.
///
/// This enum is used to identify which stage of the pipeline an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred during tensor operations.
    TensorOperation,
    /// Error occurred during post-processing of model scores.
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::TensorOperation => write!(f, "tensor operation"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// A plain message error used as the source of pipeline errors that have no
/// underlying library error.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

/// Enum representing the errors that can occur in the recognition pipeline.
///
/// Image decode failures and inference failures keep their original kind so
/// that callers can decide how to present them; the pipeline itself performs
/// no error translation.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Error occurred while decoding an image file.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred while loading the model artifact. Fatal: the process
    /// cannot serve predictions without a model.
    #[error("model load failed for '{}': {context}", path.display())]
    ModelLoad {
        /// Path to the model artifact.
        path: PathBuf,
        /// Additional context about the failure.
        context: String,
        /// The underlying ONNX Runtime error, if any.
        #[source]
        source: Option<ort::Error>,
    },

    /// Error occurred during the forward pass or while validating its output.
    #[error("inference")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error occurred during a preprocessing or post-processing stage.
    #[error("{stage} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        stage: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl RecognitionError {
    /// Creates a RecognitionError for a model load failure.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the model artifact.
    /// * `context` - Additional context about the failure.
    /// * `source` - The underlying ONNX Runtime error, if any.
    pub fn model_load_error(
        path: impl AsRef<Path>,
        context: impl Into<String>,
        source: Option<ort::Error>,
    ) -> Self {
        Self::ModelLoad {
            path: path.as_ref().to_path_buf(),
            context: context.into(),
            source,
        }
    }

    /// Creates a RecognitionError for an inference failure.
    pub fn inference_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Inference(Box::new(error))
    }

    /// Creates a RecognitionError for an inference failure described by a message.
    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::Inference(Box::new(SimpleError::new(message)))
    }

    /// Creates a RecognitionError for a processing stage failure.
    ///
    /// # Arguments
    ///
    /// * `stage` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing_error(
        stage: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            stage,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a RecognitionError for tensor operations.
    pub fn tensor_operation(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::TensorOperation, context, error)
    }

    /// Creates a RecognitionError for normalization operations.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::Normalization, context, error)
    }

    /// Creates a RecognitionError for post-processing operations.
    pub fn post_processing(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::PostProcessing, context, error)
    }

    /// Creates a RecognitionError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a RecognitionError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Returns true when the error is fatal for the whole process.
    ///
    /// A missing or corrupt model artifact means no prediction can ever be
    /// served, so startup must be aborted. Every other kind is scoped to a
    /// single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelLoad { .. })
    }

    /// Returns true when the error originates from reading or decoding the
    /// input image (the decode error kind).
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::ImageLoad(_) | Self::Io(_))
    }
}

impl From<image::ImageError> for RecognitionError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<crate::core::config::ConfigError> for RecognitionError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_load_is_fatal() {
        let err = RecognitionError::model_load_error("model.onnx", "missing artifact", None);
        assert!(err.is_fatal());
        assert!(!err.is_decode_error());
    }

    #[test]
    fn io_is_decode_kind() {
        let err = RecognitionError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert!(err.is_decode_error());
        assert!(!err.is_fatal());
    }

    #[test]
    fn processing_stage_display() {
        assert_eq!(ProcessingStage::Normalization.to_string(), "normalization");
        assert_eq!(
            ProcessingStage::PostProcessing.to_string(),
            "post-processing"
        );
    }
}
