//! ODS Admin Storage Library
//!
//! This crate persists uploaded bulk-load files to a working directory on the
//! local filesystem.
//!
//! # Directory layout
//!
//! Every call to `save_files_to_upload_directory` creates a fresh directory
//! `{base}/{uuid}` holding only the files of that request, so the directory can
//! be handed to the bulk loader as-is and removed as a unit afterwards.
//!
//! Stored file names never contain path separators or `..`.

pub mod local;
pub mod traits;
pub mod upload;

// Re-export commonly used types
pub use local::LocalUploadStorage;
pub use traits::{FileNaming, FileUploadHandler, StorageError, StorageResult};
pub use upload::{UploadedFile, UploadedFileHandle};
