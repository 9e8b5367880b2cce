//! Test helpers: build AppState and router over in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p odsadmin-api`.
#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use odsadmin_api::constants;
use odsadmin_api::setup::routes;
use odsadmin_api::state::AppState;
use odsadmin_core::models::{
    ApiMode, BulkUploadCredential, BulkUploadJobContext, CloudOdsEnvironment, InstanceContext,
    LearningStandardsJobContext, OdsSecretConfiguration,
};
use odsadmin_core::{AdminAppConfig, Config, ServerConfig};
use odsadmin_storage::LocalUploadStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use fakes::{
    FixedVersions, MemoryInstances, MemorySecrets, RecordingJobQueue, RecordingSetupCommand,
};
use odsadmin_api::services::ConfiguredConnectionProvider;

/// Upload limit used by every test app
pub const TEST_MAX_BYTES: u64 = 1000;

pub const ODS_API_URL: &str = "http://example.com";

/// Instance with stored bulk credentials
pub const INSTANCE_WITH_CREDENTIALS: i32 = 1;
/// Instance with a secret configuration but no bulk credentials
pub const INSTANCE_WITHOUT_CREDENTIALS: i32 = 2;
/// Instance with no secret configuration at all
pub const INSTANCE_WITHOUT_CONFIGURATION: i32 = 3;

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub secrets: Arc<MemorySecrets>,
    pub setup_command: Arc<RecordingSetupCommand>,
    pub bulk_jobs: Arc<RecordingJobQueue<BulkUploadJobContext>>,
    pub learning_standards_jobs: Arc<RecordingJobQueue<LearningStandardsJobContext>>,
    pub upload_dir: TempDir,
    pub xsd_folder: PathBuf,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Directories currently present under the upload root
    pub fn upload_directories(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .expect("read upload dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect()
    }
}

pub struct TestAppOptions {
    pub api_mode: ApiMode,
    pub api_version: &'static str,
    pub standard_version: &'static str,
    pub instance_name: &'static str,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            api_mode: ApiMode::Sandbox,
            api_version: "5.0.0",
            standard_version: "3.2.0-c",
            instance_name: "EdFi_Ods_Production",
        }
    }
}

fn test_config(upload_dir: &TempDir, xsd_folder: PathBuf, api_mode: ApiMode) -> Config {
    Config(Box::new(AdminAppConfig {
        base: ServerConfig {
            server_port: 0,
            cors_origins: vec!["http://localhost:3000".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 1,
            environment: "test".to_string(),
            log_json: false,
        },
        database_url: String::new(),
        ods_api_url: ODS_API_URL.to_string(),
        api_mode,
        cloud_ods_environment: CloudOdsEnvironment::Production,
        bulk_upload_max_bytes: TEST_MAX_BYTES,
        upload_directory: upload_dir.path().to_path_buf(),
        xsd_folder,
        encryption_key: "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=".to_string(),
        bulk_load_client_path: None,
        learning_standards_client_path: None,
        version_probe_timeout_secs: 1,
        job_queue_size: 4,
    }))
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let upload_dir = TempDir::new().expect("Failed to create upload dir");
    let xsd_folder = PathBuf::from("/schemas");
    let config = test_config(&upload_dir, xsd_folder.clone(), options.api_mode);

    let instances = Arc::new(MemoryInstances::new(vec![
        InstanceContext::new(INSTANCE_WITH_CREDENTIALS, options.instance_name),
        InstanceContext::new(INSTANCE_WITHOUT_CREDENTIALS, options.instance_name),
        InstanceContext::new(INSTANCE_WITHOUT_CONFIGURATION, options.instance_name),
    ]));

    let secrets = Arc::new(MemorySecrets::default());
    secrets
        .insert(
            INSTANCE_WITH_CREDENTIALS,
            OdsSecretConfiguration {
                bulk_upload_credential: Some(BulkUploadCredential {
                    api_key: "key".to_string(),
                    api_secret: "secret".to_string(),
                }),
                learning_standards_credential: None,
            },
        )
        .await;
    secrets
        .insert(INSTANCE_WITHOUT_CREDENTIALS, OdsSecretConfiguration::default())
        .await;

    let uploads = Arc::new(
        LocalUploadStorage::new(upload_dir.path())
            .await
            .expect("Failed to create upload storage"),
    );
    let setup_command = Arc::new(RecordingSetupCommand::default());
    let bulk_jobs = Arc::new(RecordingJobQueue::<BulkUploadJobContext>::default());
    let learning_standards_jobs =
        Arc::new(RecordingJobQueue::<LearningStandardsJobContext>::default());

    let state = Arc::new(AppState {
        config: config.clone(),
        pool: None,
        instances,
        secrets: secrets.clone(),
        connections: Arc::new(ConfiguredConnectionProvider::new(
            ODS_API_URL,
            options.api_mode,
        )),
        versions: Arc::new(FixedVersions::new(
            options.api_version,
            options.standard_version,
        )),
        uploads,
        learning_standards_setup: setup_command.clone(),
        bulk_jobs: bulk_jobs.clone(),
        learning_standards_jobs: learning_standards_jobs.clone(),
    });

    let app = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        secrets,
        setup_command,
        bulk_jobs,
        learning_standards_jobs,
        upload_dir,
        xsd_folder,
    }
}
