// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model seams used by the HTTP handlers
//!
//! Handlers only see these traits. The ONNX-backed implementations live in
//! `vision::yolo` and `vision::classifier`; tests substitute mocks.

use image::DynamicImage;
use thiserror::Error;

use super::labels::LabelMap;

/// Errors raised while running a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid model input: {0}")]
    InvalidInput(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),
}

impl From<ort::Error> for ModelError {
    fn from(e: ort::Error) -> Self {
        ModelError::Inference(e.to_string())
    }
}

/// One detected object in original image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub class_id: usize,
}

impl RawDetection {
    pub fn bbox(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &RawDetection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Object detector: image in, boxes out
///
/// Implementations must be safe to share across request tasks.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync {
    /// Detect objects, in the order the model ranks them
    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, ModelError>;

    /// Label table owned by this detector
    fn labels(&self) -> &LabelMap;
}

/// Image classifier: image in, probability vector out
#[cfg_attr(test, mockall::automock)]
pub trait ImageClassifier: Send + Sync {
    /// Probabilities over [`ImageClassifier::labels`], in label order
    fn predict(&self, image: &DynamicImage) -> Result<Vec<f32>, ModelError>;

    fn labels(&self) -> &LabelMap;
}
