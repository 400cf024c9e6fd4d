// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 ONNX detector

use anyhow::Result;
use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::postprocessing::{decode_output, DecodeParams};
use super::preprocessing::{letterbox, YOLO_INPUT_SIZE};
use crate::vision::labels::LabelMap;
use crate::vision::model::{ModelError, ObjectDetector, RawDetection};
use crate::vision::session::{first_input_name, load_cpu_session};

/// Configuration for loading the detector
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX export of the detection model
    pub model_path: PathBuf,
    /// Square input size the model was exported with
    pub input_size: u32,
    pub decode: DecodeParams,
    /// Class index to label table
    pub labels: LabelMap,
    pub intra_threads: usize,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/flatfoot_detection_yolov8.onnx"),
            input_size: YOLO_INPUT_SIZE,
            decode: DecodeParams::default(),
            labels: LabelMap::detection_default(),
            intra_threads: 4,
        }
    }
}

/// YOLOv8 detector backed by ONNX Runtime
///
/// `Session::run` needs exclusive access, so calls are serialised through
/// the session mutex. The detector itself is shared read-only.
#[derive(Clone)]
pub struct YoloDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    input_size: u32,
    decode: DecodeParams,
    labels: LabelMap,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("decode", &self.decode)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector, failing if the artifact is missing or invalid
    pub fn new(config: YoloConfig) -> Result<Self> {
        let session = load_cpu_session(&config.model_path, config.intra_threads)?;
        let input_name = first_input_name(&session, "images");

        info!(
            "✅ YOLO detector loaded (input: {}, size: {}, classes: {:?})",
            input_name,
            config.input_size,
            config.labels.as_slice()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size: config.input_size,
            decode: config.decode,
            labels: config.labels,
        })
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<RawDetection>, ModelError> {
        let start = Instant::now();
        let (input, geometry) = letterbox(image, self.input_size)?;

        let input_value = Value::from_array(input)?;

        let detections = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| ModelError::Inference("detector session lock poisoned".to_string()))?;

            let outputs = session.run(ort::inputs![&self.input_name => input_value])?;

            let output_tensor = outputs[0].try_extract_array::<f32>()?;
            debug!("Detection output shape: {:?}", output_tensor.shape());

            decode_output(output_tensor.view(), self.decode)?
        };

        let detections: Vec<RawDetection> = detections
            .into_iter()
            .map(|d| geometry.restore(d))
            .collect();

        debug!(
            "Detected {} objects in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }

    fn labels(&self) -> &LabelMap {
        &self.labels
    }
}
