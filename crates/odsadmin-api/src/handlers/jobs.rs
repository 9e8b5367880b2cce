use axum::{
    extract::{Path, State},
    Json,
};
use odsadmin_core::models::JobKind;
use odsadmin_core::AppError;
use odsadmin_worker::JobStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::extractors::ResolvedInstance;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobStatusPath {
    kind: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobStatusResponse {
    pub kind: JobKind,
    pub status: JobStatus,
    /// Whether the running job targets the requested instance
    pub is_same_ods_instance: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/instances/{id}/jobs/{kind}/status",
    tag = "jobs",
    params(
        ("id" = i32, Path, description = "ODS instance ID"),
        ("kind" = String, Path, description = "Job kind: bulk-load or learning-standards")
    ),
    responses(
        (status = 200, description = "Current runner status", body = JobStatusResponse),
        (status = 400, description = "Unknown job kind", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(ods_instance.id = instance.0.id))]
pub async fn get_job_status(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
    Path(path): Path<JobStatusPath>,
) -> Result<Json<JobStatusResponse>, HttpAppError> {
    let ResolvedInstance(instance) = instance;
    let kind = path.kind.parse::<JobKind>().map_err(AppError::InvalidInput)?;

    let (status, is_same_ods_instance) = match kind {
        JobKind::BulkLoad => (
            state.bulk_jobs.status().await,
            state.bulk_jobs.is_same_ods_instance(instance.id).await,
        ),
        JobKind::LearningStandards => (
            state.learning_standards_jobs.status().await,
            state
                .learning_standards_jobs
                .is_same_ods_instance(instance.id)
                .await,
        ),
    };

    Ok(Json(JobStatusResponse {
        kind,
        status,
        is_same_ods_instance,
    }))
}
