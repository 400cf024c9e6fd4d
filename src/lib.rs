// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod storage;
pub mod vision;

pub use api::{create_router, AppState};
pub use config::ServerConfig;
pub use vision::{VisionModelConfig, VisionModelManager};
