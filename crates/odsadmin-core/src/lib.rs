//! ODS Admin Core Library
//!
//! This crate provides the domain models, error types, configuration, encryption
//! and provider traits shared by every ODS Admin component.

pub mod config;
pub mod constants;
pub mod encryption;
pub mod error;
pub mod models;
pub mod providers;

// Re-export commonly used types
pub use config::{AdminAppConfig, Config, ServerConfig};
pub use encryption::EncryptionService;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use providers::{OdsInstanceLookup, OdsSecretConfigurationProvider};
