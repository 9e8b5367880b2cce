//! Job context and executor traits
//!
//! The API provides executors that run the external bulk loader and learning
//! standards programs. The runner calls `execute` for each dequeued job.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use odsadmin_core::models::{BulkUploadJobContext, JobKind, LearningStandardsJobContext};

/// Unit of work accepted by a runner
pub trait JobContext: Send + Sync + 'static {
    fn kind(&self) -> JobKind;

    /// Instance the job operates on, used for the same-instance check
    fn ods_instance_id(&self) -> i32;
}

impl JobContext for BulkUploadJobContext {
    fn kind(&self) -> JobKind {
        JobKind::BulkLoad
    }

    fn ods_instance_id(&self) -> i32 {
        self.ods_instance_id
    }
}

impl JobContext for LearningStandardsJobContext {
    fn kind(&self) -> JobKind {
        JobKind::LearningStandards
    }

    fn ods_instance_id(&self) -> i32 {
        self.ods_instance_id
    }
}

/// Executes one job to completion.
#[async_trait]
pub trait JobExecutor<C: JobContext>: Send + Sync {
    async fn execute(&self, job_id: Uuid, context: &C) -> Result<()>;
}
