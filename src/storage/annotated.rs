// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotated image storage
//!
//! Overlays are written into a single output directory and served back
//! from it. Writes go through a temp file in the same directory followed by
//! a rename, so a concurrent reader never observes a half-written PNG.

use std::io::Write;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Prefix added to every annotated file name
pub const ANNOTATED_PREFIX: &str = "annotated_";

/// Stem used when the upload carries no usable file name
pub const FALLBACK_STEM: &str = "upload";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode annotated image: {0}")]
    Encode(String),

    #[error("Invalid annotated file name: {0}")]
    InvalidName(String),
}

/// Derive the overlay file name for an uploaded file name
///
/// Pure function of its input: directories are dropped, the last
/// extension is replaced with `.png`, and `annotated_` is prefixed.
pub fn annotated_file_name(upload_name: Option<&str>) -> String {
    let base = upload_name
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let stem = if stem.is_empty() || stem == "." || stem == ".." {
        FALLBACK_STEM
    } else {
        stem
    };

    format!("{}{}.png", ANNOTATED_PREFIX, stem)
}

/// Output directory holding annotated images
#[derive(Debug, Clone)]
pub struct AnnotatedImageStore {
    output_dir: PathBuf,
}

impl AnnotatedImageStore {
    /// Open the store, creating the directory if needed
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|source| StorageError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Atomically write `bytes` to `file_name` inside the output directory,
    /// replacing any existing file of that name
    pub fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        if !is_plain_file_name(file_name) {
            return Err(StorageError::InvalidName(file_name.to_string()));
        }

        let target = self.output_dir.join(file_name);
        let write_err = |source| StorageError::Write {
            path: target.clone(),
            source,
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".annotated-")
            .suffix(".tmp")
            .tempfile_in(&self.output_dir)
            .map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;

        debug!("Saved annotated image {} ({} bytes)", target.display(), bytes.len());
        Ok(target)
    }

    /// Resolve a request path to a file inside the output directory
    ///
    /// Returns `None` for anything that is missing, not a regular file, or
    /// would land outside the directory (`..`, absolute paths, symlinks).
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let mut relative = PathBuf::new();
        for component in Path::new(request_path).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if relative.as_os_str().is_empty() {
            return None;
        }

        let root = self.output_dir.canonicalize().ok()?;
        let candidate = root.join(relative).canonicalize().ok()?;
        if !candidate.starts_with(&root) || !candidate.is_file() {
            return None;
        }

        Some(candidate)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
