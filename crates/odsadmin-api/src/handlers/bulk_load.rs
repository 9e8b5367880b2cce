use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use odsadmin_core::constants::messages;
use odsadmin_core::models::{
    BulkFileUploadModel, BulkUploadCredential, MessageResponse, SaveBulkUploadCredentialsRequest,
};
use odsadmin_core::AppError;
use odsadmin_storage::UploadedFile;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::constants::BULK_FILES_FIELD;
use crate::error::{multipart_error, ErrorResponse, HttpAppError, ValidatedJson};
use crate::extractors::ResolvedInstance;
use crate::services::bulk_upload::{BulkLoadStatusResponse, BulkUploadService};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/instances/{id}/bulk-load",
    tag = "bulk-load",
    params(("id" = i32, Path, description = "ODS instance ID")),
    responses(
        (status = 200, description = "Bulk load form", body = BulkFileUploadModel),
        (status = 404, description = "Instance or secret configuration not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(ods_instance.id = instance.0.id))]
pub async fn get_bulk_load_form(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<Json<BulkFileUploadModel>, HttpAppError> {
    let ResolvedInstance(instance) = instance;

    let secret_configuration = state
        .secrets
        .get_secret_configuration(instance.id)
        .await?
        .ok_or(AppError::NullSecretConfiguration)?;

    let is_job_running = state.bulk_jobs.is_job_running().await;
    let is_same_ods_instance = state.bulk_jobs.is_same_ods_instance(instance.id).await;

    let model = BulkFileUploadModel::from_secret_configuration(
        state.config.cloud_ods_environment(),
        &secret_configuration,
    )
    .with_job_status(is_job_running, is_same_ods_instance);

    Ok(Json(model))
}

/// Multipart body of a bulk upload
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct BulkFilesForm {
    /// Exactly one XML file
    #[schema(rename = "bulkFiles", value_type = String, format = Binary)]
    bulk_files: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/v1/instances/{id}/bulk-load/files",
    tag = "bulk-load",
    params(("id" = i32, Path, description = "ODS instance ID")),
    request_body(content = BulkFilesForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Job started or already running", body = BulkLoadStatusResponse),
        (status = 204, description = "No file uploaded"),
        (status = 400, description = "More than one file, or credentials missing", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "ODS API version could not be determined", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(ods_instance.id = instance.0.id))]
pub async fn upload_bulk_files(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
    mut multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let ResolvedInstance(instance) = instance;
    let max_bytes = state.config.bulk_upload_max_bytes();

    let files = read_bulk_files(&mut multipart, max_bytes).await?;

    match BulkUploadService::new(&state).upload(&instance, &files).await? {
        Some(status) => Ok(Json(status).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Reads the `bulkFiles` parts of an upload.
///
/// Parts are streamed and counted against `max_bytes`, so an oversize file is
/// reported as FILE_TOO_LARGE even when the body limit cuts the stream short.
/// A second file is rejected as soon as its part starts, before its bytes are
/// read.
async fn read_bulk_files(
    multipart: &mut Multipart,
    max_bytes: u64,
) -> Result<Vec<UploadedFile>, HttpAppError> {
    let mut files = Vec::new();
    let mut oversize: Option<u64> = None;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(read_error(e, oversize, max_bytes)),
        };
        if field.name() != Some(BULK_FILES_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let file_seen = !files.is_empty() || oversize.is_some();
        if file_seen && !file_name.is_empty() {
            return Err(AppError::MultipleFilesNotSupported.into());
        }
        let content_type = field.content_type().map(str::to_string);

        let mut size: u64 = 0;
        let mut data = Vec::new();
        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => return Err(read_error(e, oversize, max_bytes)),
            };
            if chunk.is_empty() {
                continue;
            }
            // A nameless part only counts once it carries data
            if file_seen {
                return Err(AppError::MultipleFilesNotSupported.into());
            }

            size = size.saturating_add(chunk.len() as u64);
            if size > max_bytes {
                oversize = Some(size);
                data = Vec::new();
            } else {
                data.extend_from_slice(&chunk);
            }
        }

        if size > max_bytes {
            continue;
        }
        // Browsers send an empty part when no file was picked
        if file_name.is_empty() && data.is_empty() {
            continue;
        }

        files.push(UploadedFile::new(
            file_name,
            content_type,
            Bytes::from(data),
        ));
    }

    match oversize {
        Some(size) => Err(AppError::FileTooLarge {
            size,
            max: max_bytes,
        }
        .into()),
        None => Ok(files),
    }
}

/// A stream that fails after the file went over the limit was cut short by
/// the body limit.
fn read_error(err: MultipartError, oversize: Option<u64>, max_bytes: u64) -> HttpAppError {
    match oversize {
        Some(size) => HttpAppError(AppError::FileTooLarge {
            size,
            max: max_bytes,
        }),
        None => multipart_error(err, max_bytes),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/instances/{id}/bulk-load/credentials",
    tag = "bulk-load",
    params(("id" = i32, Path, description = "ODS instance ID")),
    request_body = SaveBulkUploadCredentialsRequest,
    responses(
        (status = 200, description = "Credentials saved", body = MessageResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(ods_instance.id = instance.0.id))]
pub async fn save_bulk_load_credentials(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
    ValidatedJson(request): ValidatedJson<SaveBulkUploadCredentialsRequest>,
) -> Result<Json<MessageResponse>, HttpAppError> {
    let ResolvedInstance(instance) = instance;

    let mut secret_configuration = state
        .secrets
        .get_secret_configuration(instance.id)
        .await?
        .unwrap_or_default();

    secret_configuration.bulk_upload_credential = Some(BulkUploadCredential {
        api_key: request.api_key,
        api_secret: request.api_secret,
    });

    state
        .secrets
        .set_secret_configuration(instance.id, &secret_configuration)
        .await?;

    tracing::info!("Bulk load credentials saved");
    Ok(Json(MessageResponse::new(messages::CREDENTIALS_SAVED)))
}

#[utoipa::path(
    post,
    path = "/api/v1/instances/{id}/bulk-load/credentials/reset",
    tag = "bulk-load",
    params(("id" = i32, Path, description = "ODS instance ID")),
    responses(
        (status = 200, description = "Credentials reset", body = MessageResponse),
        (status = 400, description = "No credentials saved", body = ErrorResponse),
        (status = 404, description = "Secret configuration not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(ods_instance.id = instance.0.id))]
pub async fn reset_bulk_load_credentials(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
) -> Result<Json<MessageResponse>, HttpAppError> {
    let ResolvedInstance(instance) = instance;

    let mut secret_configuration = state
        .secrets
        .get_secret_configuration(instance.id)
        .await?
        .ok_or(AppError::NullSecretConfiguration)?;

    if secret_configuration.bulk_upload_credential.take().is_none() {
        return Err(AppError::MissingCredentials.into());
    }

    state
        .secrets
        .set_secret_configuration(instance.id, &secret_configuration)
        .await?;

    tracing::info!("Bulk load credentials reset");
    Ok(Json(MessageResponse::new(messages::CREDENTIALS_RESET)))
}
