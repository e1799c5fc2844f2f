//! File storage for uploaded attachments.
//!
//! Uploads land on the local filesystem under a configurable base directory
//! and are referenced by a relative key that is stored on the owning row
//! (lesson attachment, assignment submission). Keys are prefixed with the
//! upload timestamp so re-uploads of the same filename never collide.

use std::fmt;
use std::path::PathBuf;
use tokio::fs;

use crate::config::uploads::UploadConfig;

/// MIME types accepted for lesson and submission attachments.
pub const PDF_MIME_TYPES: &[&str] = &["application/pdf"];

/// MIME types accepted for bulk-import spreadsheets.
pub const SPREADSHEET_MIME_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

#[derive(Debug)]
pub enum StorageError {
    InvalidFileSize { max_bytes: usize },
    InvalidMimeType { received: String },
    IoError(std::io::Error),
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received } => {
                write!(f, "Invalid file type: {}", received)
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Local filesystem storage.
#[derive(Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            base_dir: config.upload_dir.clone(),
            max_file_size: config.max_file_size,
        }
    }

    /// Build a collision-free storage key for an uploaded file:
    /// `{unix_millis}-{sanitized original name}`.
    pub fn timestamped_key(original_name: &str) -> String {
        let sanitized: String = original_name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}-{}", chrono::Utc::now().timestamp_millis(), sanitized)
    }

    /// Check a declared MIME type against an allow-list.
    pub fn validate_mime(content_type: &str, allowed: &[&str]) -> Result<(), StorageError> {
        if allowed.contains(&content_type) {
            Ok(())
        } else {
            Err(StorageError::InvalidMimeType {
                received: content_type.to_string(),
            })
        }
    }

    // Keys must stay inside the upload directory.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Persist file content under `key`, returning the stored relative path.
    pub async fn save(&self, key: &str, content: &[u8]) -> Result<String, StorageError> {
        Self::validate_key(key)?;

        if content.len() > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }

        let file_path = self.base_dir.join(key);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&file_path, content).await?;

        Ok(key.to_string())
    }

    /// Delete a stored file; missing files are not an error.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        Self::validate_key(key)?;

        let file_path = self.base_dir.join(key);

        match fs::remove_file(&file_path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert!(LocalFileStorage::validate_key("lessons/1712345-notes.pdf").is_ok());
        assert!(LocalFileStorage::validate_key("submissions/hw_1.pdf").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("").is_err());
    }

    #[test]
    fn test_timestamped_key_sanitizes_names() {
        let key = LocalFileStorage::timestamped_key("my report (final).pdf");
        assert!(key.ends_with("my_report__final_.pdf"));
        assert!(!key.contains(' '));
        LocalFileStorage::validate_key(&key).unwrap();
    }

    #[test]
    fn test_mime_validation() {
        assert!(LocalFileStorage::validate_mime("application/pdf", PDF_MIME_TYPES).is_ok());
        assert!(LocalFileStorage::validate_mime("image/png", PDF_MIME_TYPES).is_err());
        assert!(
            LocalFileStorage::validate_mime(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                SPREADSHEET_MIME_TYPES
            )
            .is_ok()
        );
        assert!(LocalFileStorage::validate_mime("application/pdf", SPREADSHEET_MIME_TYPES).is_err());
    }
}
