//! Tensor type aliases used across the pipeline.
//!
//! Preprocessing produces batched image tensors and classification models
//! produce per-class score matrices; both are `ndarray` arrays of `f32`.

/// A 2D tensor holding one row of class scores per batched image.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor holding a batch of images, shape (batch, height, width, channels)
/// in HWC order or (batch, channels, height, width) in CHW order.
pub type Tensor4D = ndarray::Array4<f32>;
