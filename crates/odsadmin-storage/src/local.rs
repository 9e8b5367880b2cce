use crate::traits::{FileNaming, FileUploadHandler, StorageError, StorageResult};
use crate::upload::UploadedFile;
use async_trait::async_trait;
use odsadmin_core::models::FileUploadResult;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem upload storage
#[derive(Clone, Debug)]
pub struct LocalUploadStorage {
    base_path: PathBuf,
}

impl LocalUploadStorage {
    /// Create the storage, creating `base_path` if it does not exist yet
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create upload directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalUploadStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Reduce a name to a single plain path component.
    ///
    /// Browsers may send a full client path (`C:\data\file.xml`); only the last
    /// segment is kept. Anything that would still escape the directory is rejected.
    fn sanitize_file_name(name: &str) -> StorageResult<String> {
        let last = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        if last.is_empty() || last == "." || last == ".." {
            return Err(StorageError::InvalidFileName(name.to_string()));
        }

        let mut components = Path::new(last).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(last.to_string()),
            _ => Err(StorageError::InvalidFileName(name.to_string())),
        }
    }

    async fn write_files(
        directory: &Path,
        files: &[UploadedFile],
        naming: FileNaming<'_>,
    ) -> StorageResult<Vec<String>> {
        let mut file_names = Vec::with_capacity(files.len());

        for upload in files {
            let client_name = Self::sanitize_file_name(&upload.file_name)?;
            let stored_name = naming(&client_name);
            if Self::sanitize_file_name(&stored_name)? != stored_name {
                return Err(StorageError::InvalidFileName(stored_name));
            }
            let path = directory.join(&stored_name);

            let mut file = fs::File::create(&path).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;

            file.write_all(&upload.data).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
            })?;

            file.sync_all().await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
            })?;

            tracing::info!(
                path = %path.display(),
                size_bytes = upload.data.len(),
                "Stored uploaded file"
            );

            file_names.push(stored_name);
        }

        Ok(file_names)
    }

    /// Only directories directly below the base path may be removed.
    fn ensure_within_base(&self, directory: &Path) -> StorageResult<()> {
        let relative = directory.strip_prefix(&self.base_path).map_err(|_| {
            StorageError::DeleteFailed(format!(
                "{} is outside the upload directory",
                directory.display()
            ))
        })?;

        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(StorageError::DeleteFailed(format!(
                "{} is not an upload directory",
                directory.display()
            ))),
        }
    }
}

#[async_trait]
impl FileUploadHandler for LocalUploadStorage {
    async fn save_files_to_upload_directory(
        &self,
        files: &[UploadedFile],
        naming: FileNaming<'_>,
    ) -> StorageResult<FileUploadResult> {
        let directory = self.base_path.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&directory).await?;

        let start = std::time::Instant::now();
        let file_names = match Self::write_files(&directory, files, naming).await {
            Ok(file_names) => file_names,
            Err(e) => {
                let _ = fs::remove_dir_all(&directory).await;
                return Err(e);
            }
        };

        tracing::debug!(
            directory = %directory.display(),
            file_count = file_names.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload directory written"
        );

        Ok(FileUploadResult {
            directory,
            file_names,
        })
    }

    async fn remove_directory(&self, directory: &Path) -> StorageResult<()> {
        self.ensure_within_base(directory)?;

        match fs::remove_dir_all(directory).await {
            Ok(()) => {
                tracing::debug!(directory = %directory.display(), "Upload directory removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to remove {}: {}",
                directory.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn identity(name: &str) -> String {
        name.to_string()
    }

    #[tokio::test]
    async fn test_save_creates_fresh_directory() {
        let temp = tempfile::tempdir().unwrap();
        let storage = LocalUploadStorage::new(temp.path()).await.unwrap();

        let files = vec![UploadedFile::new(
            "students.xml",
            Some("text/xml".to_string()),
            Bytes::from_static(b"<Students/>"),
        )];

        let first = storage
            .save_files_to_upload_directory(&files, &identity)
            .await
            .unwrap();
        let second = storage
            .save_files_to_upload_directory(&files, &identity)
            .await
            .unwrap();

        assert_ne!(first.directory, second.directory);
        assert!(first.directory.starts_with(temp.path()));
        assert_eq!(first.file_names, vec!["students.xml".to_string()]);

        let content = std::fs::read(first.directory.join("students.xml")).unwrap();
        assert_eq!(content, b"<Students/>");
    }

    #[tokio::test]
    async fn test_naming_function_is_applied() {
        let temp = tempfile::tempdir().unwrap();
        let storage = LocalUploadStorage::new(temp.path()).await.unwrap();
        let files = vec![UploadedFile::new("a.xml", None, Bytes::from_static(b"x"))];

        let naming = |name: &str| format!("7_{}", name);
        let result = storage
            .save_files_to_upload_directory(&files, &naming)
            .await
            .unwrap();

        assert_eq!(result.file_names, vec!["7_a.xml".to_string()]);
        assert!(result.directory.join("7_a.xml").exists());
    }

    #[tokio::test]
    async fn test_client_path_is_stripped() {
        let temp = tempfile::tempdir().unwrap();
        let storage = LocalUploadStorage::new(temp.path()).await.unwrap();
        let files = vec![UploadedFile::new(
            "..\\..\\evil\\data.xml",
            None,
            Bytes::from_static(b"x"),
        )];

        let result = storage
            .save_files_to_upload_directory(&files, &identity)
            .await
            .unwrap();

        assert_eq!(result.file_names, vec!["data.xml".to_string()]);
        assert!(result.directory.join("data.xml").exists());
    }

    #[tokio::test]
    async fn test_invalid_names_are_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let storage = LocalUploadStorage::new(temp.path()).await.unwrap();

        for name in ["", "..", "dir/"] {
            let files = vec![UploadedFile::new(name, None, Bytes::from_static(b"x"))];
            let result = storage
                .save_files_to_upload_directory(&files, &identity)
                .await;
            assert!(
                matches!(result, Err(StorageError::InvalidFileName(_))),
                "name {:?} should be rejected",
                name
            );
        }

        let files = vec![UploadedFile::new("ok.xml", None, Bytes::from_static(b"x"))];
        let escaping = |_: &str| "../escape.xml".to_string();
        let result = storage
            .save_files_to_upload_directory(&files, &escaping)
            .await;
        assert!(matches!(result, Err(StorageError::InvalidFileName(_))));

        // Failed saves leave nothing behind
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_remove_directory() {
        let temp = tempfile::tempdir().unwrap();
        let storage = LocalUploadStorage::new(temp.path()).await.unwrap();
        let files = vec![UploadedFile::new("a.xml", None, Bytes::from_static(b"x"))];

        let result = storage
            .save_files_to_upload_directory(&files, &identity)
            .await
            .unwrap();
        storage.remove_directory(&result.directory).await.unwrap();
        assert!(!result.directory.exists());

        // Removing twice is not an error
        storage.remove_directory(&result.directory).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_outside_base_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let storage = LocalUploadStorage::new(temp.path()).await.unwrap();

        let result = storage.remove_directory(other.path()).await;
        assert!(matches!(result, Err(StorageError::DeleteFailed(_))));
        assert!(other.path().exists());

        let result = storage.remove_directory(temp.path()).await;
        assert!(matches!(result, Err(StorageError::DeleteFailed(_))));
        assert!(temp.path().exists());
    }
}
