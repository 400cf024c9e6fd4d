// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static serving of rendered overlays

pub mod handler;

pub use handler::annotated_image_handler;
