//! Core traits for image reading and model scoring.
//!
//! These traits sit at the two seams of the pipeline where tests substitute
//! fakes: reading images from disk and evaluating the loaded model.

use crate::core::errors::RecognitionError;
use crate::core::tensor::{Tensor2D, Tensor4D};
use image::RgbImage;
use std::path::Path;

/// Trait for reading images from paths.
pub trait ImageReader {
    /// The error type of this image reader.
    type Error;

    /// Reads all images from the given paths.
    ///
    /// # Arguments
    ///
    /// * `imgs` - An iterator of paths to the images to read.
    ///
    /// # Returns
    ///
    /// A Result containing a vector of RGB images or an error.
    fn apply<P: AsRef<Path> + Send + Sync>(
        &self,
        imgs: impl IntoIterator<Item = P>,
    ) -> Result<Vec<RgbImage>, Self::Error>;

    /// Reads a single image from the given path.
    fn read_single<P: AsRef<Path> + Send + Sync>(
        &self,
        img_path: P,
    ) -> Result<RgbImage, Self::Error>
    where
        Self::Error: From<RecognitionError>,
    {
        let mut results = self.apply(std::iter::once(img_path))?;
        results.pop().ok_or_else(|| {
            RecognitionError::invalid_input("ImageReader::apply returned empty result").into()
        })
    }
}

/// Trait for models that score a batch of image tensors.
///
/// Implemented by the ONNX Runtime engine; test code implements it with stub
/// models returning fixed score rows. Scoring takes `&self`: the loaded model
/// is shared, read-only state and a forward pass must not mutate it.
pub trait ScoringModel {
    /// Runs one forward pass over a batch of preprocessed images and returns
    /// a (batch, classes) score matrix.
    fn infer_2d(&self, batch: &Tensor4D) -> Result<Tensor2D, RecognitionError>;
}
