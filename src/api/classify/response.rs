// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification response types

use serde::{Deserialize, Serialize};

/// Response from POST /predict/tensorflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifyResponse {
    /// Winning class name
    #[serde(rename = "class")]
    pub class_name: String,
    /// Probability of the winning class (0.0-1.0)
    pub confidence: f32,
}
