// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the Keras-exported classifier

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use ndarray::Array4;

use crate::vision::model::ModelError;

/// Default square input size for the classifier
pub const CLASSIFIER_INPUT_SIZE: u32 = 256;

/// Preprocess an image for classification
///
/// Steps:
/// 1. Resize to `size` x `size` (Keras models carry their own rescaling,
///    so raw pixel values are kept unless `pixel_scale` says otherwise)
/// 2. Drop any alpha channel
/// 3. Convert to NHWC tensor format [1, H, W, 3]
pub fn to_nhwc_tensor(
    image: &DynamicImage,
    size: u32,
    pixel_scale: f32,
) -> Result<Array4<f32>, ModelError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || size == 0 {
        return Err(ModelError::InvalidInput(format!(
            "cannot resize {}x{} image to {}",
            width, height, size
        )));
    }

    let rgb = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();

    let side = size as usize;
    let mut tensor = Array4::zeros((1, side, side, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, y as usize, x as usize, c]] = pixel[c] as f32 * pixel_scale;
        }
    }

    Ok(tensor)
}
