// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::vision::{LabelMap, RawDetection};

/// One detected object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    /// Class name, or "Unknown" for indices outside the label table
    pub label: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// `[x1, y1, x2, y2]` in original image pixels
    pub bbox: [f32; 4],
}

impl Prediction {
    pub fn from_detection(detection: &RawDetection, labels: &LabelMap) -> Self {
        Self {
            label: labels.label_for(detection.class_id).to_string(),
            confidence: detection.confidence.clamp(0.0, 1.0),
            bbox: detection.bbox(),
        }
    }
}

/// Response from POST /predict/yolo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub predictions: Vec<Prediction>,
    /// Absolute URL of the rendered overlay
    pub annotated_image_url: String,
}
