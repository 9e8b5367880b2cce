//! Upload storage abstraction

use async_trait::async_trait;
use odsadmin_core::models::FileUploadResult;
use std::path::Path;
use thiserror::Error;

use crate::upload::UploadedFile;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Maps a client-supplied file name to the name it is stored under
pub type FileNaming<'a> = &'a (dyn Fn(&str) -> String + Send + Sync);

/// Persists uploaded files for background processing
#[async_trait]
pub trait FileUploadHandler: Send + Sync {
    /// Write every file into one new directory and report where they went.
    async fn save_files_to_upload_directory(
        &self,
        files: &[UploadedFile],
        naming: FileNaming<'_>,
    ) -> StorageResult<FileUploadResult>;

    /// Remove a directory previously returned by this handler.
    async fn remove_directory(&self, directory: &Path) -> StorageResult<()>;
}

impl From<StorageError> for odsadmin_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            // The name came from the client; nothing went wrong on our side
            StorageError::InvalidFileName(_) => {
                odsadmin_core::AppError::InvalidInput(err.to_string())
            }
            _ => odsadmin_core::AppError::Storage(err.to_string()),
        }
    }
}
