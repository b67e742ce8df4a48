/*
 * Responsibility
 * - Disk storage for application files (resume / cover letter)
 * - Accept PDF / Word only: extension AND declared mime type must both match
 * - Per-file size cap; stored names are `<millis>-<random>-<basename>`
 * - Callers only ever see the stored name, never the directory it lives in
 */
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];
const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("only PDF or Word files are allowed")]
    InvalidType,
    #[error("file exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("upload io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug)]
pub struct UploadStore {
    dir: PathBuf,
    max_file_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_file_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_file_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_file_bytes(&self) -> usize {
        self.max_file_bytes
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Validate a file before anything touches the disk.
    pub fn check(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        len: usize,
    ) -> Result<(), UploadError> {
        let ext_ok = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| {
                ALLOWED_EXTENSIONS
                    .iter()
                    .any(|allowed| e.eq_ignore_ascii_case(allowed))
            });
        let mime_ok = content_type.is_some_and(|m| ALLOWED_MIME_TYPES.contains(&m));

        if !(ext_ok && mime_ok) {
            return Err(UploadError::InvalidType);
        }
        if len > self.max_file_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_file_bytes,
            });
        }
        Ok(())
    }

    /// Write the file and return its stored name (relative to the upload dir).
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let millis = chrono::Utc::now().timestamp_millis();
        let nonce = Uuid::new_v4().simple().to_string();
        let stored = format!("{}-{}-{}", millis, &nonce[..8], safe_basename(original_name));
        let path = self.dir.join(&stored);

        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");
        Ok(stored)
    }

    /// Resolves a stored name inside the upload dir; directory parts are dropped.
    pub fn path_of(&self, stored: &str) -> Option<PathBuf> {
        Path::new(stored).file_name().map(|name| self.dir.join(name))
    }

    /// Best effort; used to roll back files when the insert that references them fails.
    pub async fn remove(&self, stored: &str) {
        let Some(path) = self.path_of(stored) else {
            tracing::warn!(stored, "refusing to remove upload without a file name");
            return;
        };
        if let Err(err) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove upload");
        }
    }
}

fn safe_basename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
