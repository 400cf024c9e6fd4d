// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Letterbox preprocessing for YOLOv8 detection models

use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

use crate::vision::model::{ModelError, RawDetection};

/// Default square input size for YOLOv8 exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray used for letterbox padding
pub const PAD_COLOR: [u8; 3] = [114, 114, 114];

/// Geometry of a letterboxed image, used to map boxes back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_width: u32,
    pub orig_height: u32,
}

impl Letterbox {
    /// Map a box from model input space to original image pixels, clipped
    pub fn restore(&self, det: RawDetection) -> RawDetection {
        let max_x = self.orig_width as f32;
        let max_y = self.orig_height as f32;
        let unmap_x = |x: f32| ((x - self.pad_x) / self.scale).clamp(0.0, max_x);
        let unmap_y = |y: f32| ((y - self.pad_y) / self.scale).clamp(0.0, max_y);

        RawDetection {
            x1: unmap_x(det.x1),
            y1: unmap_y(det.y1),
            x2: unmap_x(det.x2),
            y2: unmap_y(det.y2),
            ..det
        }
    }
}

/// Preprocess an image for YOLO detection
///
/// Steps:
/// 1. Resize preserving aspect ratio to fit `target_size`
/// 2. Center on a `target_size` square padded with [`PAD_COLOR`]
/// 3. Scale pixels to [0, 1]
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn letterbox(
    image: &DynamicImage,
    target_size: u32,
) -> Result<(Array4<f32>, Letterbox), ModelError> {
    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 || target_size == 0 {
        return Err(ModelError::InvalidInput(format!(
            "cannot letterbox {}x{} image to {}",
            orig_w, orig_h, target_size
        )));
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb(PAD_COLOR));
    image::imageops::overlay(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    let size = target_size as usize;
    let mut tensor = Array4::zeros((1, 3, size, size));
    for (x, y, pixel) in canvas.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    let geometry = Letterbox {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };

    Ok((tensor, geometry))
}
