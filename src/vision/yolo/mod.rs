// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection
//!
//! Components:
//! - `preprocessing` - Letterbox resize into an NCHW tensor
//! - `postprocessing` - Output decoding and NMS
//! - `model` - ONNX Runtime session wrapper

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::{YoloConfig, YoloDetector};
pub use postprocessing::{decode_output, nms, DecodeParams};
pub use preprocessing::{letterbox, Letterbox};
