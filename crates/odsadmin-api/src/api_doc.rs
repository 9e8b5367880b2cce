//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::services;
use odsadmin_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ODS Admin API",
        version = "0.1.0",
        description = "Administration of ODS instances: bulk load credentials, bulk XML uploads and learning standards sync. All endpoints are versioned under /api/v1/."
    ),
    paths(
        // Bulk load
        handlers::bulk_load::get_bulk_load_form,
        handlers::bulk_load::upload_bulk_files,
        handlers::bulk_load::save_bulk_load_credentials,
        handlers::bulk_load::reset_bulk_load_credentials,
        // Learning standards
        handlers::learning_standards::start_learning_standards_sync,
        // Jobs
        handlers::jobs::get_job_status,
    ),
    components(
        schemas(
            models::BulkFileUploadModel,
            handlers::bulk_load::BulkFilesForm,
            models::CloudOdsEnvironment,
            models::MessageResponse,
            models::SaveBulkUploadCredentialsRequest,
            models::SaveLearningStandardsRequest,
            models::JobKind,
            odsadmin_worker::JobStatus,
            services::bulk_upload::BulkLoadStatusResponse,
            handlers::jobs::JobStatusResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "bulk-load", description = "Bulk load credentials and XML file uploads"),
        (name = "learning-standards", description = "Learning standards provider setup and sync"),
        (name = "jobs", description = "Background job status")
    )
)]
pub struct ApiDoc;

/// OpenAPI document served at `/api/openapi.json`
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
