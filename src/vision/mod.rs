// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Object detection via a YOLO ONNX export
//! - Binary image classification via a Keras ONNX export
//! - Box overlays for detection results
//!
//! Both models run on ONNX Runtime's CPU execution provider.

pub mod classifier;
pub mod image_utils;
pub mod labels;
pub mod model;
pub mod model_manager;
pub mod overlay;
pub mod session;
pub mod yolo;

pub use classifier::{ClassifierConfig, OnnxClassifier};
pub use image_utils::{decode_image_bytes, decode_image_bytes_with_limit, detect_format, encode_png, ImageError, ImageInfo};
pub use labels::{LabelMap, UNKNOWN_LABEL};
pub use model::{ImageClassifier, ModelError, ObjectDetector, RawDetection};
pub use model_manager::{VisionModelConfig, VisionModelInfo, VisionModelManager};
pub use overlay::OverlayRenderer;
pub use yolo::{DecodeParams, YoloConfig, YoloDetector};
