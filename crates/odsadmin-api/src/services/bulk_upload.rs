//! Bulk file upload validation and job context construction

use chrono::Utc;
use odsadmin_core::constants::{
    DEFAULT_MAX_SIMULTANEOUS_REQUESTS, LEGACY_MAX_SIMULTANEOUS_REQUESTS,
    LEGACY_ODS_API_MAJOR_VERSION,
};
use odsadmin_core::models::{
    BulkUploadJobContext, CloudOdsEnvironment, FileUploadResult, InstanceContext,
    OdsApiConnectionInformation,
};
use odsadmin_core::AppError;
use odsadmin_storage::{UploadedFile, UploadedFileHandle};
use odsadmin_worker::EnqueueOutcome;
use serde::Serialize;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;
use uuid::Uuid;

use super::version::InferOdsApiVersion;
use crate::state::AppState;

/// Check the uploaded file list. `Ok(None)` means nothing was uploaded.
///
/// Cardinality is checked before size. A file of exactly `max_bytes` is accepted.
pub fn guard_upload<F: UploadedFileHandle>(
    files: &[F],
    max_bytes: u64,
) -> Result<Option<&F>, AppError> {
    match files {
        [] => Ok(None),
        [file] if file.length() > max_bytes => Err(AppError::FileTooLarge {
            size: file.length(),
            max: max_bytes,
        }),
        [file] => Ok(Some(file)),
        _ => Err(AppError::MultipleFilesNotSupported),
    }
}

/// Concurrency and schema selected from the target API's versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub max_simultaneous_requests: u32,
    pub schema_path: PathBuf,
}

fn major_version(version: &str) -> Result<u64, AppError> {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .next()
        .and_then(|major| major.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            AppError::UpstreamApi(format!("Unrecognized ODS API version '{}'", version))
        })
}

/// ODS API 3.x and older only tolerate a single request at a time.
pub fn max_simultaneous_requests(api_version: &str) -> Result<u32, AppError> {
    if major_version(api_version)? <= LEGACY_ODS_API_MAJOR_VERSION {
        Ok(LEGACY_MAX_SIMULTANEOUS_REQUESTS)
    } else {
        Ok(DEFAULT_MAX_SIMULTANEOUS_REQUESTS)
    }
}

pub async fn select_throttle(
    versions: &dyn InferOdsApiVersion,
    api_server_url: &str,
    schema_base_dir: &Path,
) -> Result<ThrottlePolicy, AppError> {
    let api_version = versions.version(api_server_url).await?;
    let standard_version = versions.edfi_standard_version(api_server_url).await?;

    let max_simultaneous_requests = max_simultaneous_requests(&api_version)?;
    tracing::debug!(
        api_version = %api_version,
        standard_version = %standard_version,
        max_simultaneous_requests,
        "Throttle selected"
    );

    Ok(ThrottlePolicy {
        max_simultaneous_requests,
        schema_path: schema_base_dir.join(standard_version.trim()),
    })
}

pub fn build_job_context(
    environment: CloudOdsEnvironment,
    upload: &FileUploadResult,
    instance: &InstanceContext,
    connection: &OdsApiConnectionInformation,
    throttle: &ThrottlePolicy,
) -> BulkUploadJobContext {
    BulkUploadJobContext {
        environment: environment.value().to_string(),
        data_directory_full_path: upload.directory.clone(),
        ods_instance_id: instance.id,
        api_base_url: connection.api_base_url(),
        oauth_url: connection.oauth_url(),
        metadata_url: connection.metadata_url(),
        dependencies_url: connection.dependencies_url(),
        client_key: connection.client_key().to_string(),
        client_secret: connection.client_secret().to_string(),
        schema_path: throttle.schema_path.clone(),
        max_simultaneous_requests: throttle.max_simultaneous_requests,
    }
}

/// Response for an accepted upload
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkLoadStatusResponse {
    /// Set when this request started the job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    pub is_job_running: bool,
    pub is_same_ods_instance: bool,
}

impl From<EnqueueOutcome> for BulkLoadStatusResponse {
    fn from(outcome: EnqueueOutcome) -> Self {
        match outcome {
            EnqueueOutcome::Started { job_id } => Self {
                job_id: Some(job_id),
                is_job_running: true,
                is_same_ods_instance: true,
            },
            EnqueueOutcome::AlreadyRunning { same_instance } => Self {
                job_id: None,
                is_job_running: true,
                is_same_ods_instance: same_instance,
            },
        }
    }
}

/// Runs one bulk upload request against the application state
pub struct BulkUploadService<'a> {
    state: &'a AppState,
}

impl<'a> BulkUploadService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// `Ok(None)` when no file was uploaded.
    #[tracing::instrument(skip(self, files), fields(ods_instance.id = instance.id, file_count = files.len()))]
    pub async fn upload(
        &self,
        instance: &InstanceContext,
        files: &[UploadedFile],
    ) -> Result<Option<BulkLoadStatusResponse>, AppError> {
        let config = &self.state.config;

        if guard_upload(files, config.bulk_upload_max_bytes())?.is_none() {
            return Ok(None);
        }

        let secret_configuration = self
            .state
            .secrets
            .get_secret_configuration(instance.id)
            .await?
            .ok_or(AppError::NullSecretConfiguration)?;
        let credential = secret_configuration
            .bulk_upload_credential
            .ok_or(AppError::MissingCredentials)?;

        let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let instance_id = instance.id;
        let naming = move |name: &str| format!("{}_{}_{}", instance_id, timestamp, name);
        let upload = self
            .state
            .uploads
            .save_files_to_upload_directory(files, &naming)
            .await?;

        match self.submit(instance, &upload, credential.api_key, credential.api_secret).await {
            Ok(EnqueueOutcome::Started { job_id }) => {
                tracing::info!(
                    job.id = %job_id,
                    directory = %upload.directory.display(),
                    "Bulk load job started"
                );
                Ok(Some(EnqueueOutcome::Started { job_id }.into()))
            }
            Ok(outcome) => {
                self.discard(&upload).await;
                Ok(Some(outcome.into()))
            }
            Err(e) => {
                self.discard(&upload).await;
                Err(e)
            }
        }
    }

    async fn submit(
        &self,
        instance: &InstanceContext,
        upload: &FileUploadResult,
        client_key: String,
        client_secret: String,
    ) -> Result<EnqueueOutcome, AppError> {
        let config = &self.state.config;
        let environment = config.cloud_ods_environment();

        let connection = self
            .state
            .connections
            .get_connection_information_for_environment(environment, instance)?
            .with_client_credentials(client_key, client_secret);

        let throttle = select_throttle(
            self.state.versions.as_ref(),
            connection.api_server_url(),
            config.xsd_folder(),
        )
        .await?;

        let context = build_job_context(environment, upload, instance, &connection, &throttle);
        self.state.bulk_jobs.try_enqueue(context).await
    }

    /// Best effort; the upload is already rejected or superseded.
    async fn discard(&self, upload: &FileUploadResult) {
        if let Err(e) = self.state.uploads.remove_directory(&upload.directory).await {
            tracing::warn!(
                directory = %upload.directory.display(),
                error = %e,
                "Failed to remove unused upload directory"
            );
        }
    }
}
