//! Image normalization for model input.
//!
//! Maps u8 pixel channels into the floating-point range the model was
//! trained on. The parameters fold into one multiply-add per channel:
//! `alpha = scale / std`, `beta = -mean / std`, so a normalized value is
//! `v * alpha + beta`. The shipped recipe model uses plain divide-by-255
//! (scale 1/255, zero mean, unit std), which lands every value in [0, 1].

use crate::core::RecognitionError;
use crate::core::tensor::Tensor4D;
use crate::processors::types::ChannelOrder;
use image::RgbImage;
use rayon::prelude::*;

/// Normalizes images into batched model-input tensors.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factor for each channel (alpha = scale / std).
    pub alpha: Vec<f32>,
    /// Offset for each channel (beta = -mean / std).
    pub beta: Vec<f32>,
    /// Channel ordering of the produced tensor.
    pub order: ChannelOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0).
    /// * `mean` - Optional per-channel mean (defaults to [0.0, 0.0, 0.0]).
    /// * `std` - Optional per-channel std (defaults to [1.0, 1.0, 1.0]).
    /// * `order` - Optional channel ordering (defaults to HWC).
    ///
    /// # Errors
    ///
    /// Returns an error if the scale is not positive, the mean or std
    /// vectors don't have exactly 3 elements, or any std value is not
    /// positive.
    pub fn new(
        scale: Option<f32>,
        mean: Option<Vec<f32>>,
        std: Option<Vec<f32>>,
        order: Option<ChannelOrder>,
    ) -> Result<Self, RecognitionError> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or_else(|| vec![0.0, 0.0, 0.0]);
        let std = std.unwrap_or_else(|| vec![1.0, 1.0, 1.0]);
        let order = order.unwrap_or_default();

        if scale <= 0.0 {
            return Err(RecognitionError::config_error(
                "scale must be greater than 0",
            ));
        }
        if mean.len() != 3 {
            return Err(RecognitionError::config_error(
                "mean must have exactly 3 elements for RGB",
            ));
        }
        if std.len() != 3 {
            return Err(RecognitionError::config_error(
                "std must have exactly 3 elements for RGB",
            ));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(RecognitionError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let alpha: Vec<f32> = std.iter().map(|s| scale / s).collect();
        let beta: Vec<f32> = mean.iter().zip(&std).map(|(m, s)| -m / s).collect();

        Ok(Self { alpha, beta, order })
    }

    /// Creates the normalization used by the shipped recipe model:
    /// divide-by-255 into [0, 1], HWC layout.
    pub fn for_unit_range() -> Result<Self, RecognitionError> {
        Self::new(None, None, None, Some(ChannelOrder::HWC))
    }

    /// Normalizes a single image into a tensor with a leading batch
    /// dimension of 1.
    pub fn normalize_to(&self, img: &RgbImage) -> Result<Tensor4D, RecognitionError> {
        self.normalize_batch_to(std::slice::from_ref(img))
    }

    /// Normalizes a batch of same-sized images into one batched tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is empty or the images don't all share
    /// the same dimensions.
    pub fn normalize_batch_to(&self, imgs: &[RgbImage]) -> Result<Tensor4D, RecognitionError> {
        if imgs.is_empty() {
            return Err(RecognitionError::invalid_input(
                "cannot normalize an empty batch",
            ));
        }

        let batch_size = imgs.len();
        let (width, height) = imgs[0].dimensions();
        for (i, img) in imgs.iter().enumerate() {
            if img.dimensions() != (width, height) {
                return Err(RecognitionError::invalid_input(format!(
                    "all images in batch must have the same dimensions; image 0: {}x{}, image {}: {}x{}",
                    width,
                    height,
                    i,
                    img.width(),
                    img.height()
                )));
            }
        }

        let channels = 3usize;
        let img_size = (height as usize) * (width as usize) * channels;
        let mut result = vec![0.0f32; batch_size * img_size];

        let fill = |batch_slice: &mut [f32], img: &RgbImage| {
            let (w, h) = (width as usize, height as usize);
            match self.order {
                ChannelOrder::HWC => {
                    for (x, y, pixel) in img.enumerate_pixels() {
                        let base = (y as usize * w + x as usize) * channels;
                        for c in 0..channels {
                            batch_slice[base + c] =
                                pixel[c] as f32 * self.alpha[c] + self.beta[c];
                        }
                    }
                }
                ChannelOrder::CHW => {
                    for (x, y, pixel) in img.enumerate_pixels() {
                        for c in 0..channels {
                            let dst = c * h * w + y as usize * w + x as usize;
                            batch_slice[dst] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                        }
                    }
                }
            }
        };

        if batch_size <= 1 {
            // Avoid rayon overhead for single-image batches.
            fill(&mut result, &imgs[0]);
        } else {
            result
                .par_chunks_mut(img_size)
                .enumerate()
                .for_each(|(batch_idx, batch_slice)| fill(batch_slice, &imgs[batch_idx]));
        }

        let shape = match self.order {
            ChannelOrder::HWC => (batch_size, height as usize, width as usize, channels),
            ChannelOrder::CHW => (batch_size, channels, height as usize, width as usize),
        };

        ndarray::Array4::from_shape_vec(shape, result)
            .map_err(|e| RecognitionError::normalization("failed to create batch tensor", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn unit_range_tensor_has_hwc_shape_and_bounded_values() {
        let normalize = NormalizeImage::for_unit_range().unwrap();
        let img = gradient_image(224, 224);

        let tensor = normalize.normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn pixel_values_map_exactly() {
        let normalize = NormalizeImage::for_unit_range().unwrap();
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 128, 255]));
        img.put_pixel(1, 0, Rgb([255, 0, 51]));

        let tensor = normalize.normalize_to(&img).unwrap();
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
        assert_eq!(tensor[[0, 0, 0, 1]], 128.0 / 255.0);
        assert_eq!(tensor[[0, 0, 0, 2]], 1.0);
        assert_eq!(tensor[[0, 0, 1, 0]], 1.0);
        assert_eq!(tensor[[0, 0, 1, 2]], 51.0 / 255.0);
    }

    #[test]
    fn chw_order_transposes_layout() {
        let normalize =
            NormalizeImage::new(None, None, None, Some(ChannelOrder::CHW)).unwrap();
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([255, 0, 0]));

        let tensor = normalize.normalize_to(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 2]);
        assert_eq!(tensor[[0, 0, 0, 1]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 1]], 0.0);
    }

    #[test]
    fn batch_stacks_along_leading_axis() {
        let normalize = NormalizeImage::for_unit_range().unwrap();
        let imgs = vec![gradient_image(8, 8), gradient_image(8, 8)];

        let tensor = normalize.normalize_batch_to(&imgs).unwrap();
        assert_eq!(tensor.shape(), &[2, 8, 8, 3]);
    }

    #[test]
    fn mismatched_batch_dimensions_rejected() {
        let normalize = NormalizeImage::for_unit_range().unwrap();
        let imgs = vec![gradient_image(8, 8), gradient_image(4, 8)];
        assert!(normalize.normalize_batch_to(&imgs).is_err());
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(NormalizeImage::new(Some(0.0), None, None, None).is_err());
        assert!(NormalizeImage::new(None, Some(vec![0.5; 2]), None, None).is_err());
        assert!(
            NormalizeImage::new(None, None, Some(vec![1.0, 0.0, 1.0]), None).is_err()
        );
    }
}
