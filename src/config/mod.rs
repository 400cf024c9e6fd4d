// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration from flags and environment variables

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::vision::classifier::ClassifierConfig;
use crate::vision::labels::{LabelMap, DEFAULT_CLASSIFICATION_LABELS, DEFAULT_DETECTION_LABELS};
use crate::vision::model_manager::VisionModelConfig;
use crate::vision::yolo::{DecodeParams, YoloConfig};

/// Origins allowed by CORS when none are configured
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://localhost:3000",
    "http://localhost:5173",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("{0} must not be empty")]
    EmptyLabels(&'static str),

    #[error("Invalid public base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("Invalid CORS origin '{0}'")]
    InvalidOrigin(String),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "footscan-api", about = "Foot scan detection and classification API")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "API_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8001)]
    pub port: u16,

    /// Base URL clients use to reach this service (used in annotated image URLs)
    #[arg(long, env = "PUBLIC_BASE_URL", default_value = "http://localhost:8000")]
    pub public_base_url: String,

    /// Directory annotated images are written to and served from
    #[arg(long, env = "OUTPUT_DIR", default_value = "annotated_images")]
    pub output_dir: PathBuf,

    /// YOLO detection model (ONNX)
    #[arg(
        long = "detector-model",
        env = "DETECTOR_MODEL_PATH",
        default_value = "./models/flatfoot_detection_yolov8.onnx"
    )]
    pub detector_model_path: PathBuf,

    /// Classification model (ONNX)
    #[arg(
        long = "classifier-model",
        env = "CLASSIFIER_MODEL_PATH",
        default_value = "./models/hallux_valgus_model.onnx"
    )]
    pub classifier_model_path: PathBuf,

    /// Detector class names in class index order
    #[arg(
        long,
        env = "DETECTOR_LABELS",
        value_delimiter = ',',
        default_values = DEFAULT_DETECTION_LABELS.iter().copied()
    )]
    pub detector_labels: Vec<String>,

    /// Classifier class names in output order
    #[arg(
        long,
        env = "CLASSIFIER_LABELS",
        value_delimiter = ',',
        default_values = DEFAULT_CLASSIFICATION_LABELS.iter().copied()
    )]
    pub classifier_labels: Vec<String>,

    #[arg(long, env = "DETECTOR_INPUT_SIZE", default_value_t = 640)]
    pub detector_input_size: u32,

    /// Minimum detection confidence
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    /// IoU above which same-class boxes are suppressed
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou_threshold: f32,

    #[arg(long, env = "CLASSIFIER_INPUT_SIZE", default_value_t = 256)]
    pub classifier_input_size: u32,

    /// Multiplier applied to raw 0-255 pixel values before classification
    #[arg(long, env = "CLASSIFIER_PIXEL_SCALE", default_value_t = 1.0)]
    pub classifier_pixel_scale: f32,

    /// TrueType font for overlay labels; a system font is tried when unset
    #[arg(long, env = "OVERLAY_FONT_PATH")]
    pub font_path: Option<PathBuf>,

    /// Allowed CORS origins
    #[arg(
        long,
        env = "CORS_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = DEFAULT_CORS_ORIGINS.iter().copied()
    )]
    pub cors_origins: Vec<String>,

    /// Maximum accepted upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// ONNX Runtime intra-op threads per model
    #[arg(long, env = "ORT_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl ServerConfig {
    /// Check values clap cannot check on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("confidence threshold", self.confidence_threshold),
            ("IoU threshold", self.iou_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.detector_input_size == 0 {
            return Err(ConfigError::ZeroValue("detector input size"));
        }
        if self.classifier_input_size == 0 {
            return Err(ConfigError::ZeroValue("classifier input size"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroValue("max upload bytes"));
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::ZeroValue("intra threads"));
        }

        if self.detector_labels.is_empty() {
            return Err(ConfigError::EmptyLabels("detector labels"));
        }
        if self.classifier_labels.is_empty() {
            return Err(ConfigError::EmptyLabels("classifier labels"));
        }

        self.public_base_url()?;

        for origin in &self.cors_origins {
            match Url::parse(origin) {
                Ok(url) if url.has_host() => {}
                _ => return Err(ConfigError::InvalidOrigin(origin.clone())),
            }
        }

        Ok(())
    }

    pub fn public_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.public_base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            value: self.public_base_url.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.public_base_url.clone(),
                reason: "not a base URL".to_string(),
            });
        }
        Ok(url)
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Model loading settings derived from the flags
    pub fn vision_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            detector: YoloConfig {
                model_path: self.detector_model_path.clone(),
                input_size: self.detector_input_size,
                decode: DecodeParams {
                    confidence_threshold: self.confidence_threshold,
                    iou_threshold: self.iou_threshold,
                },
                labels: LabelMap::new(trimmed(&self.detector_labels)),
                intra_threads: self.intra_threads,
            },
            classifier: ClassifierConfig {
                model_path: self.classifier_model_path.clone(),
                input_size: self.classifier_input_size,
                pixel_scale: self.classifier_pixel_scale,
                labels: LabelMap::new(trimmed(&self.classifier_labels)),
                intra_threads: self.intra_threads,
            },
        }
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}
