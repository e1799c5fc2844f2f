use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct UploadConfig {
    /// Directory where uploaded files are stored
    pub upload_dir: PathBuf,
    /// Public URL prefix for serving stored files
    pub base_url: String,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("storage/uploads")),
            base_url: env::var("UPLOAD_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/files".to_string()),
            max_file_size: env::var("UPLOAD_MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024), // 10MB
        }
    }
}
