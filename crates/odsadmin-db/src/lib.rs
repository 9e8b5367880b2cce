//! Database repositories for data access layer
//!
//! Postgres-backed implementations of the provider traits declared in
//! `odsadmin-core`.

pub mod repositories;

pub use repositories::{OdsInstanceRepository, SecretConfigurationRepository};
