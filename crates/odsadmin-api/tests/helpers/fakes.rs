//! In-memory doubles for the traits AppState holds.

use async_trait::async_trait;
use odsadmin_api::services::{InferOdsApiVersion, LearningStandardsSetupCommand};
use odsadmin_core::models::{AcademicBenchmarkConfig, InstanceContext, OdsSecretConfiguration};
use odsadmin_core::{AppError, OdsInstanceLookup, OdsSecretConfigurationProvider};
use odsadmin_worker::{EnqueueOutcome, JobContext, JobQueue, JobStatus};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct MemoryInstances {
    instances: HashMap<i32, InstanceContext>,
}

impl MemoryInstances {
    pub fn new(instances: Vec<InstanceContext>) -> Self {
        Self {
            instances: instances.into_iter().map(|i| (i.id, i)).collect(),
        }
    }
}

#[async_trait]
impl OdsInstanceLookup for MemoryInstances {
    async fn get_instance_context(
        &self,
        ods_instance_id: i32,
    ) -> Result<Option<InstanceContext>, AppError> {
        Ok(self.instances.get(&ods_instance_id).cloned())
    }
}

#[derive(Default)]
pub struct MemorySecrets {
    rows: Mutex<HashMap<i32, OdsSecretConfiguration>>,
}

impl MemorySecrets {
    pub async fn insert(&self, ods_instance_id: i32, configuration: OdsSecretConfiguration) {
        self.rows.lock().await.insert(ods_instance_id, configuration);
    }

    pub async fn get(&self, ods_instance_id: i32) -> Option<OdsSecretConfiguration> {
        self.rows.lock().await.get(&ods_instance_id).cloned()
    }
}

#[async_trait]
impl OdsSecretConfigurationProvider for MemorySecrets {
    async fn get_secret_configuration(
        &self,
        ods_instance_id: i32,
    ) -> Result<Option<OdsSecretConfiguration>, AppError> {
        Ok(self.get(ods_instance_id).await)
    }

    async fn set_secret_configuration(
        &self,
        ods_instance_id: i32,
        configuration: &OdsSecretConfiguration,
    ) -> Result<(), AppError> {
        self.insert(ods_instance_id, configuration.clone()).await;
        Ok(())
    }
}

pub struct FixedVersions {
    api_version: String,
    standard_version: String,
}

impl FixedVersions {
    pub fn new(api_version: &str, standard_version: &str) -> Self {
        Self {
            api_version: api_version.to_string(),
            standard_version: standard_version.to_string(),
        }
    }
}

#[async_trait]
impl InferOdsApiVersion for FixedVersions {
    async fn version(&self, _api_server_url: &str) -> Result<String, AppError> {
        Ok(self.api_version.clone())
    }

    async fn edfi_standard_version(&self, _api_server_url: &str) -> Result<String, AppError> {
        Ok(self.standard_version.clone())
    }
}

#[derive(Default)]
pub struct RecordingSetupCommand {
    calls: Mutex<Vec<(i32, AcademicBenchmarkConfig)>>,
}

impl RecordingSetupCommand {
    pub async fn calls(&self) -> Vec<(i32, AcademicBenchmarkConfig)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl LearningStandardsSetupCommand for RecordingSetupCommand {
    async fn execute(
        &self,
        ods_instance_id: i32,
        config: &AcademicBenchmarkConfig,
    ) -> Result<(), AppError> {
        self.calls
            .lock()
            .await
            .push((ods_instance_id, config.clone()));
        Ok(())
    }
}

/// Job queue that records submissions and never runs them. A job started
/// through `try_enqueue` stays running until `finish` is called.
pub struct RecordingJobQueue<C> {
    inner: Mutex<RecordedJobs<C>>,
}

struct RecordedJobs<C> {
    submitted: Vec<C>,
    running: Option<(Uuid, i32)>,
}

impl<C> Default for RecordingJobQueue<C> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(RecordedJobs {
                submitted: Vec::new(),
                running: None,
            }),
        }
    }
}

impl<C: Clone> RecordingJobQueue<C> {
    pub async fn submitted(&self) -> Vec<C> {
        self.inner.lock().await.submitted.clone()
    }

    /// Pretend a job for `ods_instance_id` is running
    pub async fn mark_running(&self, ods_instance_id: i32) {
        self.inner.lock().await.running = Some((Uuid::new_v4(), ods_instance_id));
    }
}

#[async_trait]
impl<C: JobContext + Clone> JobQueue<C> for RecordingJobQueue<C> {
    async fn is_job_running(&self) -> bool {
        self.inner.lock().await.running.is_some()
    }

    async fn is_same_ods_instance(&self, ods_instance_id: i32) -> bool {
        matches!(self.inner.lock().await.running, Some((_, id)) if id == ods_instance_id)
    }

    async fn enqueue_job(&self, context: C) -> Result<Uuid, AppError> {
        self.inner.lock().await.submitted.push(context);
        Ok(Uuid::new_v4())
    }

    async fn try_enqueue(&self, context: C) -> Result<EnqueueOutcome, AppError> {
        let mut inner = self.inner.lock().await;
        if let Some((_, running_instance)) = inner.running {
            return Ok(EnqueueOutcome::AlreadyRunning {
                same_instance: running_instance == context.ods_instance_id(),
            });
        }

        let job_id = Uuid::new_v4();
        inner.running = Some((job_id, context.ods_instance_id()));
        inner.submitted.push(context);
        Ok(EnqueueOutcome::Started { job_id })
    }

    async fn status(&self) -> JobStatus {
        match self.inner.lock().await.running {
            Some((job_id, ods_instance_id)) => JobStatus::Running {
                job_id,
                ods_instance_id,
                started_at: chrono::Utc::now(),
            },
            None => JobStatus::Idle,
        }
    }
}
