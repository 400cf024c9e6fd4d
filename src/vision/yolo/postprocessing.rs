// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding YOLOv8 output tensors into detections
//!
//! Two export layouts are understood:
//! - raw head `[1, 4 + num_classes, anchors]`: cx, cy, w, h followed by one
//!   score per class for every anchor. Needs thresholding and NMS here.
//! - NMS-exported `[1, N, 6]`: rows of `[x1, y1, x2, y2, confidence, class]`,
//!   already suppressed by the model. Rows pass through in model order.
//!
//! Coordinates stay in model input space; see `Letterbox::restore`.

use ndarray::ArrayViewD;
use tracing::debug;

use crate::vision::model::{ModelError, RawDetection};

/// Ultralytics default confidence threshold
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Ultralytics default NMS IoU threshold
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Upper bound on detections kept by [`nms`]
pub const MAX_DETECTIONS: usize = 300;

/// Width of a row in the NMS-exported layout
const NMS_ROW_WIDTH: usize = 6;

#[derive(Debug, Clone, Copy)]
pub struct DecodeParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

/// Decode a detection output tensor
///
/// Raw head output is ranked by [`nms`]; NMS-exported rows keep the order
/// the model emitted them in.
pub fn decode_output(
    output: ArrayViewD<f32>,
    params: DecodeParams,
) -> Result<Vec<RawDetection>, ModelError> {
    let shape = output.shape().to_vec();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(ModelError::UnexpectedOutput(format!(
            "expected [1, C, N] detection output, got {:?}",
            shape
        )));
    }

    if shape[2] == NMS_ROW_WIDTH {
        debug!("Decoding NMS-exported output {:?}", shape);
        Ok(decode_nms_rows(&output, shape[1], params))
    } else if shape[1] > 4 {
        debug!("Decoding raw YOLOv8 head output {:?}", shape);
        let candidates = decode_raw_head(&output, shape[1] - 4, shape[2], params);
        Ok(nms(candidates, params.iou_threshold))
    } else {
        Err(ModelError::UnexpectedOutput(format!(
            "unsupported detection output shape {:?}",
            shape
        )))
    }
}

fn decode_nms_rows(
    output: &ArrayViewD<f32>,
    rows: usize,
    params: DecodeParams,
) -> Vec<RawDetection> {
    let mut detections = Vec::new();

    for i in 0..rows {
        let value = |k: usize| output[[0, i, k]];
        let confidence = value(4);
        let class = value(5);

        if !(confidence >= params.confidence_threshold) || !class.is_finite() || class < 0.0 {
            continue;
        }

        detections.push(RawDetection {
            x1: value(0),
            y1: value(1),
            x2: value(2),
            y2: value(3),
            confidence: confidence.min(1.0),
            class_id: class.round() as usize,
        });
    }

    detections
}

fn decode_raw_head(
    output: &ArrayViewD<f32>,
    num_classes: usize,
    anchors: usize,
    params: DecodeParams,
) -> Vec<RawDetection> {
    let mut candidates = Vec::new();

    for i in 0..anchors {
        let mut best_class = 0;
        let mut best_score = f32::MIN;
        for class_idx in 0..num_classes {
            let score = output[[0, 4 + class_idx, i]];
            if score > best_score {
                best_score = score;
                best_class = class_idx;
            }
        }

        if !(best_score >= params.confidence_threshold) {
            continue;
        }

        let cx = output[[0, 0, i]];
        let cy = output[[0, 1, i]];
        let w = output[[0, 2, i]];
        let h = output[[0, 3, i]];

        candidates.push(RawDetection {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            confidence: best_score.min(1.0),
            class_id: best_class,
        });
    }

    candidates
}

/// Class-aware greedy non-maximum suppression
///
/// Output is sorted by descending confidence and capped at
/// [`MAX_DETECTIONS`].
pub fn nms(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<RawDetection> = Vec::new();
    for candidate in detections {
        let suppressed = keep
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            keep.push(candidate);
            if keep.len() == MAX_DETECTIONS {
                break;
            }
        }
    }

    keep
}
