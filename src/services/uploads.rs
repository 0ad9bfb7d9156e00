use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// A file persisted under the upload root.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Path relative to the upload root, e.g. `products/<uuid>.jpg`.
    pub relative_path: String,
    pub size: usize,
}

/// Disk-backed store for uploaded files.
///
/// Files are renamed to UUIDs on save; the caller keeps the returned
/// relative path in the database and removes it best-effort if the
/// surrounding write fails.
#[derive(Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validated_extension(original_filename: &str) -> Result<String, ServiceError> {
        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| {
                ServiceError::ValidationError("File must have an extension".to_string())
            })?;

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ServiceError::ValidationError(format!(
                "Unsupported file type '.{ext}', allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        Ok(ext)
    }

    /// Persists `bytes` under `<root>/<subdir>/<uuid>.<ext>`.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(
        &self,
        subdir: &str,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::ValidationError("File is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::ValidationError(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }
        let ext = Self::validated_extension(original_filename)?;

        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ServiceError::InternalError(format!("upload dir create failed: {e}")))?;

        let filename = format!("{}.{ext}", Uuid::new_v4());
        let path = dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::InternalError(format!("upload write failed: {e}")))?;

        debug!(path = %path.display(), "upload stored");
        Ok(StoredFile {
            relative_path: format!("{subdir}/{filename}"),
            size: bytes.len(),
        })
    }

    /// Best-effort removal, used to clean up after a failed database write
    /// or when an image is replaced. Never fails the caller.
    pub async fn remove(&self, relative_path: &str) {
        // Refuse anything that could escape the upload root.
        if relative_path.contains("..") || relative_path.starts_with('/') {
            warn!(relative_path, "refusing suspicious upload path");
            return;
        }
        let path = self.root.join(relative_path);
        if let Err(err) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %err, "upload cleanup failed");
        }
    }
}
