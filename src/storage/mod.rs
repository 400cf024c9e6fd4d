// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod annotated;

pub use annotated::{annotated_file_name, AnnotatedImageStore, StorageError, ANNOTATED_PREFIX};
