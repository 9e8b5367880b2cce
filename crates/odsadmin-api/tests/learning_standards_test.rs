//! Learning standards and job status API integration tests.
//!
//! Run with: `cargo test -p odsadmin-api --test learning_standards_test`

mod helpers;

use axum::http::StatusCode;
use helpers::{
    api_path, setup_test_app, setup_test_app_with, TestAppOptions, INSTANCE_WITH_CREDENTIALS,
    INSTANCE_WITHOUT_CREDENTIALS,
};
use odsadmin_core::models::ApiMode;
use serde_json::{json, Value};

fn sync_path(id: i32) -> String {
    api_path(&format!("/instances/{}/learning-standards", id))
}

#[tokio::test]
async fn test_sync_runs_setup_and_starts_job() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&sync_path(INSTANCE_WITH_CREDENTIALS))
        .json(&json!({ "api_key": "ab-key", "api_secret": "ab-secret" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_job_running"], true);
    assert_eq!(body["is_same_ods_instance"], true);

    let calls = app.setup_command.calls().await;
    assert_eq!(calls.len(), 1);
    let (instance_id, config) = &calls[0];
    assert_eq!(*instance_id, INSTANCE_WITH_CREDENTIALS);
    assert_eq!(config.api_key, "ab-key");
    assert_eq!(config.api_secret, "ab-secret");
    assert_eq!(config.ods_api_mode, ApiMode::Sandbox);

    let submitted = app.learning_standards_jobs.submitted().await;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].environment, "Production");
    assert_eq!(submitted[0].api_url, "http://example.com");
    assert_eq!(submitted[0].ods_instance_id, INSTANCE_WITH_CREDENTIALS);
    assert_eq!(submitted[0].school_year, None);
}

#[tokio::test]
async fn test_sync_year_specific_sets_school_year() {
    let app = setup_test_app_with(TestAppOptions {
        api_mode: ApiMode::YearSpecific,
        instance_name: "Ed_Fi_Ods_1234",
        ..TestAppOptions::default()
    })
    .await;

    app.client()
        .post(&sync_path(INSTANCE_WITH_CREDENTIALS))
        .json(&json!({ "api_key": "ab-key", "api_secret": "ab-secret" }))
        .await
        .assert_status_ok();

    let submitted = app.learning_standards_jobs.submitted().await;
    assert_eq!(submitted[0].school_year, Some(1234));
    let calls = app.setup_command.calls().await;
    assert_eq!(calls[0].1.ods_api_mode, ApiMode::YearSpecific);
}

#[tokio::test]
async fn test_sync_without_school_year_stores_no_credentials() {
    let app = setup_test_app_with(TestAppOptions {
        api_mode: ApiMode::YearSpecific,
        instance_name: "Ed_Fi_Ods",
        ..TestAppOptions::default()
    })
    .await;

    let response = app
        .client()
        .post(&sync_path(INSTANCE_WITH_CREDENTIALS))
        .json(&json!({ "api_key": "ab-key", "api_secret": "ab-secret" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(app.setup_command.calls().await.is_empty());
    assert!(app.learning_standards_jobs.submitted().await.is_empty());
}

#[tokio::test]
async fn test_sync_while_running_reports_running_job() {
    let app = setup_test_app().await;
    app.learning_standards_jobs
        .mark_running(INSTANCE_WITH_CREDENTIALS)
        .await;

    let response = app
        .client()
        .post(&sync_path(INSTANCE_WITH_CREDENTIALS))
        .json(&json!({ "api_key": "ab-key", "api_secret": "ab-secret" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["is_job_running"], true);
    assert_eq!(body["is_same_ods_instance"], true);
    assert!(body.get("job_id").is_none());
    assert!(app.learning_standards_jobs.submitted().await.is_empty());
}

#[tokio::test]
async fn test_sync_requires_credentials() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&sync_path(INSTANCE_WITH_CREDENTIALS))
        .json(&json!({ "api_key": "ab-key", "api_secret": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(app.setup_command.calls().await.is_empty());
    assert!(app.learning_standards_jobs.submitted().await.is_empty());
}

#[tokio::test]
async fn test_job_status_idle() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!(
            "/instances/{}/jobs/bulk-load/status",
            INSTANCE_WITH_CREDENTIALS
        )))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["kind"], "bulk-load");
    assert_eq!(body["status"]["state"], "idle");
    assert_eq!(body["is_same_ods_instance"], false);
}

#[tokio::test]
async fn test_job_status_running_for_other_instance() {
    let app = setup_test_app().await;
    app.learning_standards_jobs
        .mark_running(INSTANCE_WITHOUT_CREDENTIALS)
        .await;

    let response = app
        .client()
        .get(&api_path(&format!(
            "/instances/{}/jobs/learning-standards/status",
            INSTANCE_WITH_CREDENTIALS
        )))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["kind"], "learning-standards");
    assert_eq!(body["status"]["state"], "running");
    assert_eq!(
        body["status"]["ods_instance_id"],
        INSTANCE_WITHOUT_CREDENTIALS
    );
    assert_eq!(body["is_same_ods_instance"], false);
}

#[tokio::test]
async fn test_job_status_unknown_kind_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path(&format!(
            "/instances/{}/jobs/reindex/status",
            INSTANCE_WITH_CREDENTIALS
        )))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_unknown_instance_not_found() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get(&api_path("/instances/999/jobs/bulk-load/status"))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_health_without_database() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "not_configured");
    assert_eq!(body["bulk_load_runner"]["state"], "idle");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["paths"]["/api/v1/instances/{id}/learning-standards"].is_object());
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/health")
        .add_header("X-Request-ID", "req-123")
        .await;

    assert_eq!(response.header("X-Request-ID"), "req-123");
}
