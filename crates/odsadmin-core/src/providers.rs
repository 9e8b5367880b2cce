//! Provider traits for persisted instance data.
//!
//! The database crate implements these against Postgres; handlers and tests
//! depend on the traits only.

use async_trait::async_trait;

use crate::models::{InstanceContext, OdsSecretConfiguration};
use crate::AppError;

/// Per-instance secret configuration store
#[async_trait]
pub trait OdsSecretConfigurationProvider: Send + Sync {
    /// Returns `None` when nothing was ever stored for the instance.
    async fn get_secret_configuration(
        &self,
        ods_instance_id: i32,
    ) -> Result<Option<OdsSecretConfiguration>, AppError>;

    /// Replaces the stored configuration for the instance.
    async fn set_secret_configuration(
        &self,
        ods_instance_id: i32,
        configuration: &OdsSecretConfiguration,
    ) -> Result<(), AppError>;
}

/// Resolves the instance a request targets
#[async_trait]
pub trait OdsInstanceLookup: Send + Sync {
    async fn get_instance_context(
        &self,
        ods_instance_id: i32,
    ) -> Result<Option<InstanceContext>, AppError>;
}
