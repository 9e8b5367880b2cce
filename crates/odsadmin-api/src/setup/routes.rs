//! Route configuration and middleware setup

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use odsadmin_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::constants::{API_PREFIX, JSON_BODY_LIMIT_BYTES, MULTIPART_OVERHEAD_BYTES};
use crate::handlers::bulk_load::{
    get_bulk_load_form, reset_bulk_load_credentials, save_bulk_load_credentials,
    upload_bulk_files,
};
use crate::handlers::health::health_check;
use crate::handlers::jobs::get_job_status;
use crate::handlers::learning_standards::start_learning_standards_sync;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = request_body_limit(config);

    let app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .nest(API_PREFIX, api_routes(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Largest upload body read: one file plus multipart framing
fn request_body_limit(config: &Config) -> usize {
    let limit = config
        .bulk_upload_max_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

fn api_routes(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/instances/{id}/bulk-load", get(get_bulk_load_form))
        .route(
            "/instances/{id}/bulk-load/credentials",
            post(save_bulk_load_credentials),
        )
        .route(
            "/instances/{id}/bulk-load/credentials/reset",
            post(reset_bulk_load_credentials),
        )
        .route(
            "/instances/{id}/learning-standards",
            post(start_learning_standards_sync),
        )
        .route("/instances/{id}/jobs/{kind}/status", get(get_job_status))
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT_BYTES))
        // Added after the layer above: the upload handler counts bytes itself
        // and answers oversize files with FILE_TOO_LARGE
        .route(
            "/instances/{id}/bulk-load/files",
            post(upload_bulk_files).layer(DefaultBodyLimit::max(body_limit)),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
