//! `AppError` and the metadata the HTTP layer renders it with.
//!
//! Upload rejections, credential problems and ODS API probe failures each get
//! their own variant so handlers never build status codes by hand. Without the
//! `sqlx` feature, `Database` carries a plain message.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::constants::messages;

/// Level an error is logged at when it is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes: bad uploads, bad ids
    Debug,
    /// Incomplete setup or an unreachable ODS API
    Warn,
    Error,
}

/// How an error presents itself over HTTP
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable code clients can branch on, e.g. `FILE_TOO_LARGE`
    fn error_code(&self) -> &'static str;

    /// Retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message shown to the caller; never includes sources
    fn client_message(&self) -> String;

    /// Details and type are withheld from the response
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{}", messages::MULTIPLE_FILES_NOT_SUPPORTED)]
    MultipleFilesNotSupported,

    #[error("{}: {size} bytes exceeds {max} bytes", messages::UPLOAD_EXCEEDS_MAXIMUM_LIMIT)]
    FileTooLarge { size: u64, max: u64 },

    #[error("{}", messages::MISSING_BULK_LOAD_CREDENTIALS)]
    MissingCredentials,

    #[error("{}", messages::NULL_SECRET_CONFIGURATION)]
    NullSecretConfiguration,

    #[error("ODS API error: {0}")]
    UpstreamApi(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Per-variant (status, code, recoverable, suggested action, sensitive, log level)
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            500,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Fix the request and send it again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Check the ODS instance id"),
            false,
            LogLevel::Debug,
        ),
        AppError::MultipleFilesNotSupported => (
            400,
            "MULTIPLE_FILES_NOT_SUPPORTED",
            false,
            Some("Upload one file per request"),
            false,
            LogLevel::Debug,
        ),
        AppError::FileTooLarge { .. } => (
            413,
            "FILE_TOO_LARGE",
            false,
            Some("Split the data into smaller files"),
            false,
            LogLevel::Debug,
        ),
        AppError::MissingCredentials => (
            400,
            "MISSING_CREDENTIALS",
            false,
            Some("Save bulk load credentials first"),
            false,
            LogLevel::Debug,
        ),
        AppError::NullSecretConfiguration => (
            404,
            "SECRET_CONFIGURATION_MISSING",
            true,
            Some("Complete the instance setup, then retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::UpstreamApi(_) => (
            502,
            "ODS_API_ERROR",
            true,
            Some("Check that the ODS API is reachable and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Variant name, echoed as `error_type` outside production
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Storage(_) => "Storage",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::MultipleFilesNotSupported => "MultipleFilesNotSupported",
            AppError::FileTooLarge { .. } => "FileTooLarge",
            AppError::MissingCredentials => "MissingCredentials",
            AppError::NullSecretConfiguration => "NullSecretConfiguration",
            AppError::UpstreamApi(_) => "UpstreamApi",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Display text followed by up to five `Caused by` lines
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Failed to store uploaded file".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::MultipleFilesNotSupported => {
                messages::MULTIPLE_FILES_NOT_SUPPORTED.to_string()
            }
            AppError::FileTooLarge { max, .. } => format!(
                "{} of {} bytes",
                messages::UPLOAD_EXCEEDS_MAXIMUM_LIMIT,
                max
            ),
            AppError::MissingCredentials => messages::MISSING_BULK_LOAD_CREDENTIALS.to_string(),
            AppError::NullSecretConfiguration => messages::NULL_SECRET_CONFIGURATION.to_string(),
            AppError::UpstreamApi(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
