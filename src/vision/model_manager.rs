// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision model manager for loading the detector and classifier

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::vision::classifier::{ClassifierConfig, OnnxClassifier};
use crate::vision::model::{ImageClassifier, ObjectDetector};
use crate::vision::yolo::{YoloConfig, YoloDetector};

/// Configuration for loading both vision models
#[derive(Debug, Clone, Default)]
pub struct VisionModelConfig {
    pub detector: YoloConfig,
    pub classifier: ClassifierConfig,
}

/// Information about a loaded vision model
#[derive(Debug, Clone)]
pub struct VisionModelInfo {
    /// Model name
    pub name: String,
    /// Model type (detection, classification)
    pub model_type: String,
    /// Artifact the model was loaded from
    pub path: PathBuf,
    /// Class names in output order
    pub labels: Vec<String>,
}

/// Owns both models for the lifetime of the process
///
/// Both artifacts are required. Loading is fail-fast so the server never
/// starts with a model missing.
pub struct VisionModelManager {
    detector: Arc<dyn ObjectDetector>,
    classifier: Arc<dyn ImageClassifier>,
    models: Vec<VisionModelInfo>,
}

impl VisionModelManager {
    /// Load the detector and classifier described by `config`
    pub fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let detector_info = VisionModelInfo {
            name: "yolo".to_string(),
            model_type: "detection".to_string(),
            path: config.detector.model_path.clone(),
            labels: config.detector.labels.as_slice().to_vec(),
        };
        let classifier_info = VisionModelInfo {
            name: "classifier".to_string(),
            model_type: "classification".to_string(),
            path: config.classifier.model_path.clone(),
            labels: config.classifier.labels.as_slice().to_vec(),
        };

        let detector = YoloDetector::new(config.detector).with_context(|| {
            format!(
                "Failed to load detection model from {}",
                detector_info.path.display()
            )
        })?;
        tracing::info!("✅ Detection model loaded from {}", detector_info.path.display());

        let classifier = OnnxClassifier::new(config.classifier).with_context(|| {
            format!(
                "Failed to load classification model from {}",
                classifier_info.path.display()
            )
        })?;
        tracing::info!(
            "✅ Classification model loaded from {}",
            classifier_info.path.display()
        );

        Ok(Self {
            detector: Arc::new(detector),
            classifier: Arc::new(classifier),
            models: vec![detector_info, classifier_info],
        })
    }

    /// Build a manager around already-constructed models
    pub fn from_models(
        detector: Arc<dyn ObjectDetector>,
        classifier: Arc<dyn ImageClassifier>,
    ) -> Self {
        let models = vec![
            VisionModelInfo {
                name: "yolo".to_string(),
                model_type: "detection".to_string(),
                path: PathBuf::new(),
                labels: detector.labels().as_slice().to_vec(),
            },
            VisionModelInfo {
                name: "classifier".to_string(),
                model_type: "classification".to_string(),
                path: PathBuf::new(),
                labels: classifier.labels().as_slice().to_vec(),
            },
        ];
        Self {
            detector,
            classifier,
            models,
        }
    }

    pub fn detector(&self) -> Arc<dyn ObjectDetector> {
        self.detector.clone()
    }

    pub fn classifier(&self) -> Arc<dyn ImageClassifier> {
        self.classifier.clone()
    }

    /// List the loaded vision models
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        self.models.clone()
    }
}
