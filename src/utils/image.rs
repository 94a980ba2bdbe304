//! Utility functions for image loading.
//!
//! This module provides functions for loading single images or batches of
//! images from files. Any raster format the `image` crate can decode is
//! accepted; JPEG and PNG are the common cases for uploaded photos.

use crate::core::RecognitionError;
use image::{DynamicImage, RgbImage};

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns the decode error kind (`RecognitionError::ImageLoad`) if the file
/// is missing, unreadable, or not a valid image.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, RecognitionError> {
    let img = image::open(path).map_err(RecognitionError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Loads a batch of images from file paths.
///
/// Uses parallel loading when the number of images exceeds the default
/// threshold.
pub fn load_images_batch<P: AsRef<std::path::Path> + Send + Sync>(
    paths: &[P],
) -> Result<Vec<RgbImage>, RecognitionError> {
    load_images_batch_with_threshold(paths, None)
}

/// Loads a batch of images from file paths with a custom parallel threshold.
///
/// # Arguments
///
/// * `paths` - Paths of the image files to load.
/// * `parallel_threshold` - Image count above which loading goes parallel;
///   `None` uses [`DEFAULT_PARALLEL_THRESHOLD`](crate::core::constants::DEFAULT_PARALLEL_THRESHOLD).
///
/// # Errors
///
/// Fails with the decode error kind if any image cannot be loaded.
pub fn load_images_batch_with_threshold<P: AsRef<std::path::Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<RgbImage>, RecognitionError> {
    use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;

    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_decode_error() {
        let err = load_image(std::path::Path::new("no/such/image.jpg")).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn invalid_bytes_are_decode_error() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"not an image at all").unwrap();

        let err = load_image(file.path()).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn valid_png_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        image::RgbImage::new(32, 16).save(&path).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(img.dimensions(), (32, 16));
    }

    #[test]
    fn batch_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 1..=3u32 {
            let path = dir.path().join(format!("img_{i}.png"));
            image::RgbImage::new(8 * i, 8).save(&path).unwrap();
            paths.push(path);
        }

        let imgs = load_images_batch(&paths).unwrap();
        assert_eq!(imgs.len(), 3);
        assert_eq!(imgs[0].width(), 8);
        assert_eq!(imgs[2].width(), 24);
    }
}
