use axum::{extract::State, Json};
use odsadmin_core::models::{AcademicBenchmarkConfig, SaveLearningStandardsRequest};
use std::sync::Arc;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::extractors::ResolvedInstance;
use crate::services::bulk_upload::BulkLoadStatusResponse;
use crate::services::learning_standards::build_job_context;
use crate::state::AppState;

/// Configure the learning standards provider and start a sync
#[utoipa::path(
    post,
    path = "/api/v1/instances/{id}/learning-standards",
    tag = "learning-standards",
    params(("id" = i32, Path, description = "ODS instance ID")),
    request_body = SaveLearningStandardsRequest,
    responses(
        (status = 200, description = "Sync started or already running", body = BulkLoadStatusResponse),
        (status = 400, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(ods_instance.id = instance.0.id))]
pub async fn start_learning_standards_sync(
    State(state): State<Arc<AppState>>,
    instance: ResolvedInstance,
    ValidatedJson(request): ValidatedJson<SaveLearningStandardsRequest>,
) -> Result<Json<BulkLoadStatusResponse>, HttpAppError> {
    let ResolvedInstance(instance) = instance;
    let environment = state.config.cloud_ods_environment();

    // Resolve the job first so a request that cannot run stores no credentials
    let connection = state
        .connections
        .get_connection_information_for_environment(environment, &instance)?;
    let context = build_job_context(environment, &instance, &connection)?;

    let benchmark_config = AcademicBenchmarkConfig {
        api_key: request.api_key,
        api_secret: request.api_secret,
        ods_api_mode: state.config.api_mode(),
    };
    state
        .learning_standards_setup
        .execute(instance.id, &benchmark_config)
        .await?;

    let outcome = state.learning_standards_jobs.try_enqueue(context).await?;
    tracing::info!(outcome = ?outcome, "Learning standards sync submitted");

    Ok(Json(outcome.into()))
}
