//! Inference utilities for the recognition pipeline.
//!
//! This module wraps ONNX Runtime sessions behind [`OrtInfer`]. The model is
//! loaded once at startup; after that the engine is shared, read-only state.
//! A small pool of sessions selected round-robin keeps concurrent predictions
//! from serializing behind a single session.

use crate::core::config::{CommonBuilderConfig, OrtSessionConfig};
use crate::core::errors::{RecognitionError, SimpleError};
use crate::core::tensor::{Tensor2D, Tensor4D};
use crate::core::traits::{ImageReader, ScoringModel};
use image::RgbImage;
use ort::{
    execution_providers::ExecutionProviderDispatch,
    session::{Session, builder::SessionBuilder},
    value::TensorRef,
};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Input tensor names probed during auto-detection, in order of preference.
const COMMON_INPUT_NAMES: [&str; 5] = ["input", "x", "images", "data", "image"];

/// A default implementation of the [`ImageReader`] trait.
///
/// Reads images from file paths, going parallel when the number of images
/// exceeds an optional threshold.
#[derive(Debug, Default)]
pub struct DefaultImageReader {
    parallel_threshold: Option<usize>,
}

impl DefaultImageReader {
    /// Creates a new DefaultImageReader with the default parallel threshold.
    pub fn new() -> Self {
        Self {
            parallel_threshold: None,
        }
    }

    /// Creates a new DefaultImageReader with a custom parallel threshold.
    pub fn with_parallel_threshold(parallel_threshold: usize) -> Self {
        Self {
            parallel_threshold: Some(parallel_threshold),
        }
    }
}

impl ImageReader for DefaultImageReader {
    type Error = RecognitionError;

    fn apply<P: AsRef<Path> + Send + Sync>(
        &self,
        imgs: impl IntoIterator<Item = P>,
    ) -> Result<Vec<RgbImage>, Self::Error> {
        use crate::utils::load_images_batch_with_threshold;

        let img_paths: Vec<_> = imgs.into_iter().collect();
        load_images_batch_with_threshold(&img_paths, self.parallel_threshold)
    }
}

/// A struct for performing inference using ONNX Runtime models.
///
/// Holds a pool of sessions over a single loaded artifact. Loading happens
/// exactly once, at construction; inference takes `&self` and never mutates
/// the loaded weights.
#[derive(Debug)]
pub struct OrtInfer {
    /// Pool of ONNX Runtime sessions for concurrent predictions.
    sessions: Vec<Mutex<Session>>,
    /// Next index for round-robin session selection.
    next_idx: AtomicUsize,
    /// The name of the input tensor.
    input_name: String,
    /// The path to the model file for error context.
    model_path: std::path::PathBuf,
    /// The model name for error context.
    model_name: String,
}

impl OrtInfer {
    /// Creates a new OrtInfer with default session settings and a single session.
    pub fn new(model_path: impl AsRef<Path>) -> Result<Self, RecognitionError> {
        Self::from_common(&CommonBuilderConfig::new(), model_path)
    }

    /// Creates a new OrtInfer from a [`CommonBuilderConfig`], applying the
    /// session configuration and constructing a session pool.
    ///
    /// The input tensor name is taken from the configuration when present and
    /// auto-detected from session metadata otherwise.
    ///
    /// # Errors
    ///
    /// Fails with the model-load error kind if the artifact path is missing
    /// or the serialized format is unreadable or incompatible. This error is
    /// fatal: a process that cannot load its model must not start serving.
    pub fn from_common(
        common: &CommonBuilderConfig,
        model_path: impl AsRef<Path>,
    ) -> Result<Self, RecognitionError> {
        let path = model_path.as_ref();
        let pool_size = common.session_pool_size.unwrap_or(1).max(1);

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let builder = Session::builder()?;
            let builder = if let Some(cfg) = &common.ort_session {
                Self::apply_ort_config(builder, cfg)?
            } else {
                builder
            };
            let session = builder.commit_from_file(path).map_err(|e| {
                RecognitionError::model_load_error(
                    path,
                    "failed to create ONNX session",
                    Some(e),
                )
            })?;
            sessions.push(Mutex::new(session));
        }

        let input_name = match &common.input_name {
            Some(name) => name.clone(),
            None => Self::detect_input_name(&sessions[0])?,
        };

        let model_name = common
            .model_name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        tracing::debug!(
            model = %model_name,
            pool_size,
            input = %input_name,
            "ONNX session pool ready"
        );

        Ok(OrtInfer {
            sessions,
            next_idx: AtomicUsize::new(0),
            input_name,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Picks the input tensor name from session metadata.
    ///
    /// Prefers the common names models in this family use; falls back to the
    /// session's first declared input.
    fn detect_input_name(session: &Mutex<Session>) -> Result<String, RecognitionError> {
        let session = session.lock().map_err(|_| {
            RecognitionError::invalid_input("failed to acquire session lock")
        })?;

        let available: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();

        if let Some(name) = COMMON_INPUT_NAMES
            .iter()
            .find(|&name| available.iter().any(|input| input == *name))
        {
            return Ok(name.to_string());
        }

        available.first().cloned().ok_or_else(|| {
            RecognitionError::invalid_input(
                "no inputs declared in session, model may be invalid or corrupted",
            )
        })
    }

    fn apply_ort_config(
        mut builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, ort::Error> {
        if let Some(intra) = cfg.intra_threads {
            builder = builder.with_intra_threads(intra)?;
        }
        if let Some(inter) = cfg.inter_threads {
            builder = builder.with_inter_threads(inter)?;
        }
        if let Some(par) = cfg.parallel_execution {
            builder = builder.with_parallel_execution(par)?;
        }
        if let Some(level) = cfg.optimization_level {
            use crate::core::config::OrtGraphOptimizationLevel as OG;
            use ort::session::builder::GraphOptimizationLevel as GOL;
            let mapped = match level {
                OG::DisableAll => GOL::Disable,
                OG::Level1 => GOL::Level1,
                OG::Level2 => GOL::Level2,
                OG::Level3 => GOL::Level3,
                OG::All => GOL::Level3,
            };
            builder = builder.with_optimization_level(mapped)?;
        }
        if let Some(eps) = &cfg.execution_providers {
            let providers = Self::build_execution_providers(eps)?;
            if !providers.is_empty() {
                builder = builder.with_execution_providers(providers)?;
            }
        }
        Ok(builder)
    }

    /// Builds execution providers from configuration.
    fn build_execution_providers(
        eps: &[crate::core::config::OrtExecutionProvider],
    ) -> Result<Vec<ExecutionProviderDispatch>, ort::Error> {
        use crate::core::config::OrtExecutionProvider as EP;
        let mut providers = Vec::new();

        for ep in eps {
            match ep {
                EP::CPU => {
                    providers
                        .push(ort::execution_providers::CPUExecutionProvider::default().build());
                }
                #[cfg(feature = "cuda")]
                EP::CUDA { device_id } => {
                    let mut cuda = ort::execution_providers::CUDAExecutionProvider::default();
                    if let Some(id) = device_id {
                        cuda = cuda.with_device_id(*id);
                    }
                    providers.push(cuda.build());
                }
                #[cfg(feature = "tensorrt")]
                EP::TensorRT { device_id } => {
                    let mut trt = ort::execution_providers::TensorRTExecutionProvider::default();
                    if let Some(id) = device_id {
                        trt = trt.with_device_id(*id);
                    }
                    providers.push(trt.build());
                }
                #[cfg(feature = "directml")]
                EP::DirectML { device_id } => {
                    let mut dml = ort::execution_providers::DirectMLExecutionProvider::default();
                    if let Some(id) = device_id {
                        dml = dml.with_device_id(*id);
                    }
                    providers.push(dml.build());
                }
                #[cfg(feature = "coreml")]
                EP::CoreML => {
                    providers
                        .push(ort::execution_providers::CoreMLExecutionProvider::default().build());
                }
                #[cfg(not(feature = "cuda"))]
                EP::CUDA { .. } => {
                    return Err(ort::Error::new(
                        "CUDA execution provider requested but cuda feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "tensorrt"))]
                EP::TensorRT { .. } => {
                    return Err(ort::Error::new(
                        "TensorRT execution provider requested but tensorrt feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "directml"))]
                EP::DirectML { .. } => {
                    return Err(ort::Error::new(
                        "DirectML execution provider requested but directml feature is not enabled",
                    ));
                }
                #[cfg(not(feature = "coreml"))]
                EP::CoreML => {
                    return Err(ort::Error::new(
                        "CoreML execution provider requested but coreml feature is not enabled",
                    ));
                }
            }
        }

        Ok(providers)
    }

    /// Gets the name of the output tensor from session metadata.
    fn get_output_name(&self) -> Result<String, RecognitionError> {
        let session = self.sessions[0].lock().map_err(|_| {
            RecognitionError::invalid_input("failed to acquire session lock")
        })?;
        if !session.outputs.is_empty() {
            Ok(session.outputs[0].name.clone())
        } else {
            Err(RecognitionError::invalid_input(
                "no outputs declared in session, model may be invalid or corrupted",
            ))
        }
    }

    /// Gets the path to the model file.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Gets the name of the model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs one forward pass and returns a (batch, classes) score matrix.
    ///
    /// # Errors
    ///
    /// Fails with the inference error kind if the forward pass fails, the
    /// output cannot be extracted as f32, or the output shape does not carry
    /// one score row per batched image.
    pub fn infer_2d(&self, x: &Tensor4D) -> Result<Tensor2D, RecognitionError> {
        let batch_size = x.shape()[0];
        let input_shape = x.shape().to_vec();

        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            RecognitionError::tensor_operation(
                &format!(
                    "failed to convert input tensor with shape {:?} for model '{}'",
                    input_shape, self.model_name
                ),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        // Round-robin select a session.
        let idx = self.next_idx.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            RecognitionError::inference_failed(format!(
                "failed to acquire session lock {}/{} for model '{}'",
                idx,
                self.sessions.len(),
                self.model_name
            ))
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            RecognitionError::inference_error(SimpleError::new(format!(
                "forward pass failed for model '{}' with input '{}' shape {:?}: {}",
                self.model_name, self.input_name, input_shape, e
            )))
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                RecognitionError::inference_error(SimpleError::new(format!(
                    "failed to extract output tensor '{}' as f32: {}",
                    output_name, e
                )))
            })?;

        if output_shape.len() != 2 {
            return Err(RecognitionError::inference_failed(format!(
                "model '{}': expected 2D output tensor, got {}D with shape {:?}",
                self.model_name,
                output_shape.len(),
                output_shape
            )));
        }

        let num_classes = output_shape[1] as usize;
        let expected_len = batch_size * num_classes;
        if output_data.len() != expected_len {
            return Err(RecognitionError::inference_failed(format!(
                "model '{}': output data size mismatch, expected {} values for shape {:?}, got {}",
                self.model_name,
                expected_len,
                output_shape,
                output_data.len()
            )));
        }

        let array_view = ndarray::ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(RecognitionError::Tensor)?;
        Ok(array_view.to_owned())
    }
}

impl ScoringModel for OrtInfer {
    fn infer_2d(&self, batch: &Tensor4D) -> Result<Tensor2D, RecognitionError> {
        OrtInfer::infer_2d(self, batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_model_load_error() {
        let result = OrtInfer::from_common(&CommonBuilderConfig::new(), "no_such_model.onnx");
        match result {
            Err(err) => assert!(err.is_fatal()),
            Ok(_) => panic!("expected model load to fail for a missing artifact"),
        }
    }

    #[test]
    fn pool_size_is_respected_in_config() {
        let common = CommonBuilderConfig::new().session_pool_size(3);
        // No artifact available in unit tests; the constructor must still
        // fail with the fatal model-load kind rather than panic.
        let result = OrtInfer::from_common(&common, "no_such_model.onnx");
        assert!(result.is_err());
    }
}
