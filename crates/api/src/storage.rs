//! Local-disk storage for uploaded photos.
//!
//! Files live below a single root directory, which is also what
//! `/uploads` serves. Database rows keep the path relative to that root.

use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use mj_core::error::CoreError;
use mj_core::types::DbId;
use mj_core::upload::{
    image_extension, relative_dir, sanitize_original_name, stored_file_name, validate_size,
    UploadKind,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;

/// A file written to disk, ready to be recorded in the database.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub original_name: String,
    /// Relative to the storage root, always with `/` separators.
    pub relative_path: String,
    pub file_size: i64,
    pub sha256: String,
}

/// Rejected upload, reported to the client as a validation error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(msg) => AppError::Core(CoreError::Validation(msg)),
            StoreError::Io(e) => AppError::Storage(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate and write one uploaded image for `project_id`.
    pub async fn store_image(
        &self,
        project_id: DbId,
        kind: UploadKind,
        original_name: &str,
        data: &[u8],
        max_bytes: usize,
    ) -> Result<StoredFile, StoreError> {
        let original_name = sanitize_original_name(original_name);
        let ext = image_extension(&original_name).map_err(StoreError::Rejected)?;
        validate_size(data.len(), max_bytes).map_err(StoreError::Rejected)?;

        let dir = relative_dir(project_id, kind);
        let file_name = stored_file_name(&ext, Utc::now(), Uuid::new_v4());
        let relative = dir.join(&file_name);

        tokio::fs::create_dir_all(self.root.join(&dir)).await?;
        tokio::fs::write(self.root.join(&relative), data).await?;

        let sha256 = format!("{:x}", Sha256::digest(data));
        tracing::debug!(
            project_id,
            path = %relative.display(),
            bytes = data.len(),
            "Stored upload"
        );

        Ok(StoredFile {
            file_name,
            original_name,
            relative_path: to_url_path(&relative),
            file_size: data.len() as i64,
            sha256,
        })
    }

    /// Remove a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative_path: &str) -> std::io::Result<()> {
        let Some(path) = self.resolve(relative_path) else {
            tracing::warn!(path = relative_path, "Refusing to remove path outside storage root");
            return Ok(());
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Best-effort removal of several files; failures are logged, not returned.
    pub async fn remove_all(&self, relative_paths: &[String]) {
        for path in relative_paths {
            if let Err(e) = self.remove(path).await {
                tracing::warn!(path = %path, error = %e, "Failed to remove stored file");
            }
        }
    }

    /// Join a stored relative path onto the root, rejecting anything that
    /// could escape it.
    fn resolve(&self, relative_path: &str) -> Option<PathBuf> {
        let relative = Path::new(relative_path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

fn to_url_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
