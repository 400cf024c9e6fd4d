// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Binary image classification (Keras model exported to ONNX)

pub mod model;
pub mod postprocessing;
pub mod preprocessing;

pub use model::{ClassifierConfig, OnnxClassifier};
pub use postprocessing::{to_probabilities, top_class};
pub use preprocessing::to_nhwc_tensor;
