//! Image resizing for model input.
//!
//! The classifier expects a fixed input geometry; source photos arrive at
//! arbitrary sizes. Resizing is a direct stretch to the target dimensions
//! with interpolation, regardless of the source aspect ratio. No
//! letterboxing: the model was trained on stretched images.

use image::RgbImage;
use image::imageops::{self, FilterType};

/// Default interpolation filter for input resizing.
pub const DEFAULT_RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Stretches an image to exactly `width` x `height` pixels.
///
/// # Arguments
///
/// * `img` - The source image.
/// * `width` - Target width in pixels.
/// * `height` - Target height in pixels.
/// * `filter` - Interpolation filter; `None` uses the triangle filter.
pub fn resize_to_input(
    img: &RgbImage,
    width: u32,
    height: u32,
    filter: Option<FilterType>,
) -> RgbImage {
    if img.width() == width && img.height() == height {
        return img.clone();
    }
    imageops::resize(img, width, height, filter.unwrap_or(DEFAULT_RESIZE_FILTER))
}

/// Stretches every image in a batch to `width` x `height` pixels.
pub fn resize_batch_to_input(
    imgs: &[RgbImage],
    width: u32,
    height: u32,
    filter: Option<FilterType>,
) -> Vec<RgbImage> {
    imgs.iter()
        .map(|img| resize_to_input(img, width, height, filter))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretches_to_exact_dimensions() {
        // Wide source: a direct stretch must ignore aspect ratio.
        let img = RgbImage::new(640, 120);
        let resized = resize_to_input(&img, 224, 224, None);
        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn already_sized_image_passes_through() {
        let img = RgbImage::new(224, 224);
        let resized = resize_to_input(&img, 224, 224, None);
        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn batch_resizes_every_image() {
        let imgs = vec![RgbImage::new(50, 80), RgbImage::new(300, 300)];
        let resized = resize_batch_to_input(&imgs, 224, 224, None);
        assert_eq!(resized.len(), 2);
        assert!(resized.iter().all(|img| img.dimensions() == (224, 224)));
    }
}
