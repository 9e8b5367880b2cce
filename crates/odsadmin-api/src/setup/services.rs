//! Service initialization and application state setup

use anyhow::{Context, Result};
use odsadmin_core::models::{BulkUploadJobContext, JobKind, LearningStandardsJobContext};
use odsadmin_core::{Config, EncryptionService};
use odsadmin_db::{OdsInstanceRepository, SecretConfigurationRepository};
use odsadmin_storage::LocalUploadStorage;
use odsadmin_worker::JobRunner;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::services::executors::{BulkLoadClientExecutor, LearningStandardsClientExecutor};
use crate::services::{
    ConfiguredConnectionProvider, HttpOdsApiVersionInference, SecretStoreLearningStandardsSetup,
};
use crate::state::AppState;

/// Initialize all services and repositories, returning the application state
pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let encryption = EncryptionService::from_base64_key(config.encryption_key())
        .context("Failed to initialize encryption service")?;

    let instances = Arc::new(OdsInstanceRepository::new(pool.clone()));
    let secrets = Arc::new(SecretConfigurationRepository::new(pool.clone(), encryption));

    let uploads = Arc::new(
        LocalUploadStorage::new(config.upload_directory())
            .await
            .context("Failed to initialize upload storage")?,
    );
    tracing::info!(
        upload_directory = %config.upload_directory().display(),
        "Upload storage initialized"
    );

    let connections = Arc::new(ConfiguredConnectionProvider::new(
        config.ods_api_url(),
        config.api_mode(),
    ));
    let versions = Arc::new(HttpOdsApiVersionInference::new(Duration::from_secs(
        config.version_probe_timeout_secs(),
    ))?);
    let learning_standards_setup = Arc::new(SecretStoreLearningStandardsSetup::new(secrets.clone()));

    let bulk_jobs = Arc::new(JobRunner::<BulkUploadJobContext>::new(
        JobKind::BulkLoad,
        Arc::new(BulkLoadClientExecutor::new(
            config.bulk_load_client_path().map(|p| p.to_path_buf()),
            uploads.clone(),
        )),
        config.job_queue_size(),
    ));
    let learning_standards_jobs = Arc::new(JobRunner::<LearningStandardsJobContext>::new(
        JobKind::LearningStandards,
        Arc::new(LearningStandardsClientExecutor::new(
            config.learning_standards_client_path().map(|p| p.to_path_buf()),
        )),
        config.job_queue_size(),
    ));
    tracing::info!(
        queue_size = config.job_queue_size(),
        "Job runners started"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        pool: Some(pool),
        instances,
        secrets,
        connections,
        versions,
        uploads,
        learning_standards_setup,
        bulk_jobs,
        learning_standards_jobs,
    }))
}
