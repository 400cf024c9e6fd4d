// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class index to label lookup

/// Label returned for class indices the table does not know
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Default detector classes
pub const DEFAULT_DETECTION_LABELS: &[&str] = &["Flat Foot", "Normal"];

/// Default classifier classes, in model output order
pub const DEFAULT_CLASSIFICATION_LABELS: &[&str] = &["Hallux Valgus", "Normal"];

/// Ordered label table, indexed by the model's class index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl LabelMap {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn detection_default() -> Self {
        Self::new(DEFAULT_DETECTION_LABELS.iter().copied())
    }

    pub fn classification_default() -> Self {
        Self::new(DEFAULT_CLASSIFICATION_LABELS.iter().copied())
    }

    /// Label for an index, if the table has one
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    /// Label for an index, falling back to [`UNKNOWN_LABEL`]
    pub fn label_for(&self, class_id: usize) -> &str {
        self.get(class_id).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}
