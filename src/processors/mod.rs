//! Image processing and score post-processing for the recognition pipeline.
//!
//! This module contains the steps between a decoded image and a predicted
//! class: stretch-resizing to the model input geometry, normalizing pixel
//! values into batched tensors, and selecting classes from score rows.

pub mod normalization;
pub mod resize;
pub mod topk;
pub mod types;

pub use normalization::NormalizeImage;
pub use resize::{DEFAULT_RESIZE_FILTER, resize_batch_to_input, resize_to_input};
pub use topk::{Topk, TopkResult, argmax, softmax_in_place};
pub use types::ChannelOrder;
