//! Local asset storage for uploaded imagery.
//!
//! Gallery uploads are issued in parallel with no all-or-nothing semantics;
//! the batch result reports each file's outcome so callers can reconcile a
//! partial failure instead of seeing a single generic alert.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty file")]
    EmptyFile,
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(String),
}

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "avif"];

/// A stored asset and its public URL.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AssetRef {
    pub id: Uuid,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UploadFailure {
    pub filename: String,
    pub error: String,
}

/// Per-file outcome of a batch upload. Never an overall error.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct BatchUploadResult {
    pub succeeded: Vec<AssetRef>,
    pub failed: Vec<UploadFailure>,
}

#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
    public_base: String,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store one file under a collision-proof name and return its reference.
    pub async fn save(&self, filename: &str, bytes: Bytes) -> Result<AssetRef, AssetError> {
        if bytes.is_empty() {
            return Err(AssetError::EmptyFile);
        }

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AssetError::UnsupportedExtension(extension));
        }

        let id = Uuid::new_v4();
        let stored_name = format!("{id}.{extension}");

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&stored_name), &bytes).await?;

        Ok(AssetRef {
            id,
            filename: filename.to_string(),
            url: format!("{}/{stored_name}", self.public_base),
        })
    }

    /// Save a batch concurrently. Order of results is not guaranteed; a
    /// failure of one file never blocks the others.
    pub async fn save_batch(&self, files: Vec<(String, Bytes)>) -> BatchUploadResult {
        let outcomes = join_all(
            files
                .into_iter()
                .map(|(name, bytes)| async move { (name.clone(), self.save(&name, bytes).await) }),
        )
        .await;

        let mut result = BatchUploadResult {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for (filename, outcome) in outcomes {
            match outcome {
                Ok(asset) => result.succeeded.push(asset),
                Err(e) => result.failed.push(UploadFailure {
                    filename,
                    error: e.to_string(),
                }),
            }
        }
        result
    }
}
