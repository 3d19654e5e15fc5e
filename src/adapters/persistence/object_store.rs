//! Implements ObjectStore on the local filesystem (audio recordings, avatars).
//!
//! Objects live at `<base_dir>/<key>`; the public URL is a `file://` URL.

use crate::domain::DomainError;
use crate::ports::ObjectStore;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub struct FsObjectStore {
    base_dir: PathBuf,
}

impl FsObjectStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve a key below the base dir. Keys may contain `/` but no `..` or absolute parts.
    fn object_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let rel = Path::new(key);
        let safe = !key.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(DomainError::Storage(format!("invalid object key '{}'", key)));
        }
        Ok(self.base_dir.join(rel))
    }
}

#[async_trait::async_trait]
impl ObjectStore for FsObjectStore {
    /// Write-replace: temp file, sync_all, rename. A crash never leaves a half-written object.
    async fn upload(&self, key: &str, bytes: &[u8]) -> Result<String, DomainError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Storage(format!("create dir: {}", e)))?;
        }

        let temp_path = path.with_extension("upload.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(bytes)
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| DomainError::Storage(format!("rename failed: {}", e)))?;

        let abs = path.canonicalize().unwrap_or_else(|_| path.clone());
        info!(path = %abs.display(), bytes = bytes.len(), "object stored");
        Ok(format!("file://{}", abs.display()))
    }
}
