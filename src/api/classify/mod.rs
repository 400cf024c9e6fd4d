// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification API endpoint module
//!
//! Provides POST /predict/tensorflow for binary image classification.

pub mod handler;
pub mod response;

pub use handler::{classify_handler, pick_class};
pub use response::ClassifyResponse;
