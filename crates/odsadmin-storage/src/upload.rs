use bytes::Bytes;

/// Read-only view of one uploaded file
pub trait UploadedFileHandle {
    fn length(&self) -> u64;
    fn file_name(&self) -> &str;
}

/// Uploaded file buffered in memory
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }
}

impl UploadedFileHandle for UploadedFile {
    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn file_name(&self) -> &str {
        &self.file_name
    }
}
