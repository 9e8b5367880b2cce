//! Application state shared by all handlers.
//!
//! Every collaborator is held behind its trait so the router can be built over
//! Postgres and the real job runners in production, or over in-memory doubles
//! in tests.

use odsadmin_core::models::{BulkUploadJobContext, LearningStandardsJobContext};
use odsadmin_core::{Config, OdsInstanceLookup, OdsSecretConfigurationProvider};
use odsadmin_storage::FileUploadHandler;
use odsadmin_worker::JobQueue;
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{
    ApiConnectionInformationProvider, InferOdsApiVersion, LearningStandardsSetupCommand,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Absent when the state is built without a database (tests)
    pub pool: Option<PgPool>,
    pub instances: Arc<dyn OdsInstanceLookup>,
    pub secrets: Arc<dyn OdsSecretConfigurationProvider>,
    pub connections: Arc<dyn ApiConnectionInformationProvider>,
    pub versions: Arc<dyn InferOdsApiVersion>,
    pub uploads: Arc<dyn FileUploadHandler>,
    pub learning_standards_setup: Arc<dyn LearningStandardsSetupCommand>,
    pub bulk_jobs: Arc<dyn JobQueue<BulkUploadJobContext>>,
    pub learning_standards_jobs: Arc<dyn JobQueue<LearningStandardsJobContext>>,
}
