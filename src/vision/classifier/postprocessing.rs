// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Turning classifier output into probabilities and a top class

use crate::vision::model::ModelError;

/// Tolerance when checking that an output already sums to one
const DISTRIBUTION_TOLERANCE: f32 = 1e-3;

/// Normalise raw classifier output into a probability vector
///
/// - a single value is a sigmoid output for the positive (second) class
/// - a vector already in [0, 1] summing to one passes through untouched
/// - anything else is treated as logits and softmaxed
pub fn to_probabilities(raw: &[f32]) -> Result<Vec<f32>, ModelError> {
    if raw.is_empty() {
        return Err(ModelError::UnexpectedOutput(
            "classifier returned an empty output".to_string(),
        ));
    }
    if raw.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::UnexpectedOutput(
            "classifier returned non-finite values".to_string(),
        ));
    }

    if raw.len() == 1 {
        let p = raw[0];
        let p = if (0.0..=1.0).contains(&p) { p } else { sigmoid(p) };
        return Ok(vec![1.0 - p, p]);
    }

    let in_range = raw.iter().all(|v| (0.0..=1.0).contains(v));
    let sum: f32 = raw.iter().sum();
    if in_range && (sum - 1.0).abs() <= DISTRIBUTION_TOLERANCE {
        return Ok(raw.to_vec());
    }

    Ok(softmax(raw))
}

/// Index and probability of the most likely class
///
/// Ties resolve to the lowest index, matching `argmax`.
pub fn top_class(probabilities: &[f32]) -> Option<(usize, f32)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, p)| match best {
            Some((_, best_p)) if best_p >= p => best,
            _ => Some((i, p)),
        })
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::MIN, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
