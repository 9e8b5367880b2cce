//! Single-slot job runner backed by a bounded channel

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use utoipa::ToSchema;
use uuid::Uuid;

use odsadmin_core::models::JobKind;
use odsadmin_core::AppError;

use crate::context::{JobContext, JobExecutor};

/// Current state of a runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    Idle,
    Running {
        job_id: Uuid,
        ods_instance_id: i32,
        started_at: DateTime<Utc>,
    },
    Completed {
        job_id: Uuid,
        ods_instance_id: i32,
        finished_at: DateTime<Utc>,
    },
    Failed {
        job_id: Uuid,
        ods_instance_id: i32,
        error: String,
        finished_at: DateTime<Utc>,
    },
}

impl JobStatus {
    fn running_job(&self) -> Option<(Uuid, i32)> {
        match self {
            JobStatus::Running {
                job_id,
                ods_instance_id,
                ..
            } => Some((*job_id, *ods_instance_id)),
            _ => None,
        }
    }
}

/// Result of an atomic check-and-enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Started { job_id: Uuid },
    AlreadyRunning { same_instance: bool },
}

/// Submission side of a job runner
#[async_trait]
pub trait JobQueue<C: JobContext>: Send + Sync {
    async fn is_job_running(&self) -> bool;

    async fn is_same_ods_instance(&self, ods_instance_id: i32) -> bool;

    /// Enqueue without checking for a running job. Jobs run one after another.
    async fn enqueue_job(&self, context: C) -> Result<Uuid, AppError>;

    /// Start the job only if nothing is running. The check and the claim happen
    /// under one lock acquisition.
    async fn try_enqueue(&self, context: C) -> Result<EnqueueOutcome, AppError>;

    async fn status(&self) -> JobStatus;
}

struct QueuedJob<C> {
    job_id: Uuid,
    context: C,
}

pub struct JobRunner<C: JobContext> {
    kind: JobKind,
    status: Arc<Mutex<JobStatus>>,
    tx: mpsc::Sender<QueuedJob<C>>,
}

impl<C: JobContext> JobRunner<C> {
    /// Create a runner and spawn its worker task.
    ///
    /// `queue_size` bounds the channel; submissions beyond it fail instead of
    /// waiting. Must be called from within a tokio runtime.
    pub fn new(kind: JobKind, executor: Arc<dyn JobExecutor<C>>, queue_size: usize) -> Self {
        let queue_size = queue_size.max(1);
        let (tx, rx) = mpsc::channel(queue_size);
        let status = Arc::new(Mutex::new(JobStatus::Idle));

        let worker_status = status.clone();
        tokio::spawn(async move {
            Self::worker(kind, rx, executor, worker_status).await;
        });

        tracing::info!(
            job.kind = %kind,
            queue_size = queue_size,
            "Job runner initialized with bounded channel"
        );

        Self { kind, status, tx }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Hand the job to the worker and mark it running. Caller holds the status lock.
    fn claim(&self, status: &mut JobStatus, context: C) -> Result<Uuid, AppError> {
        let job_id = Uuid::new_v4();
        let ods_instance_id = context.ods_instance_id();

        self.tx
            .try_send(QueuedJob { job_id, context })
            .map_err(|e| match e {
                TrySendError::Full(_) => {
                    tracing::warn!(job.kind = %self.kind, "Job queue is full, rejecting job");
                    AppError::Internal(format!("{} job queue is full", self.kind))
                }
                TrySendError::Closed(_) => {
                    AppError::Internal(format!("{} job runner has stopped", self.kind))
                }
            })?;

        *status = JobStatus::Running {
            job_id,
            ods_instance_id,
            started_at: Utc::now(),
        };

        Ok(job_id)
    }

    async fn worker(
        kind: JobKind,
        mut rx: mpsc::Receiver<QueuedJob<C>>,
        executor: Arc<dyn JobExecutor<C>>,
        status: Arc<Mutex<JobStatus>>,
    ) {
        while let Some(job) = rx.recv().await {
            Self::process_job(kind, job, executor.as_ref(), &status).await;
        }
        tracing::debug!(job.kind = %kind, "Job runner channel closed");
    }

    #[tracing::instrument(
        skip_all,
        fields(
            job.kind = %kind,
            job.id = %job.job_id,
            ods_instance.id = job.context.ods_instance_id(),
            job.status = tracing::field::Empty
        )
    )]
    async fn process_job(
        kind: JobKind,
        job: QueuedJob<C>,
        executor: &dyn JobExecutor<C>,
        status: &Mutex<JobStatus>,
    ) {
        let job_id = job.job_id;
        let ods_instance_id = job.context.ods_instance_id();

        {
            let mut current = status.lock().await;
            if current.running_job().is_none() {
                *current = JobStatus::Running {
                    job_id,
                    ods_instance_id,
                    started_at: Utc::now(),
                };
            }
        }

        let start = std::time::Instant::now();
        tracing::info!("Starting job");
        let result = executor.execute(job_id, &job.context).await;
        let elapsed = start.elapsed();

        let finished = match result {
            Ok(()) => {
                tracing::Span::current().record("job.status", "success");
                tracing::info!(
                    duration_ms = elapsed.as_millis(),
                    duration_secs = elapsed.as_secs_f64(),
                    "Job completed successfully"
                );
                JobStatus::Completed {
                    job_id,
                    ods_instance_id,
                    finished_at: Utc::now(),
                }
            }
            Err(e) => {
                tracing::Span::current().record("job.status", "failed");
                tracing::error!(
                    error = %e,
                    duration_ms = elapsed.as_millis(),
                    "Job failed"
                );
                JobStatus::Failed {
                    job_id,
                    ods_instance_id,
                    error: format!("{:#}", e),
                    finished_at: Utc::now(),
                }
            }
        };

        let mut current = status.lock().await;
        // A job queued behind this one already owns the running slot
        if current.running_job().map(|(id, _)| id) == Some(job_id) {
            *current = finished;
        }
    }
}

#[async_trait]
impl<C: JobContext> JobQueue<C> for JobRunner<C> {
    async fn is_job_running(&self) -> bool {
        self.status.lock().await.running_job().is_some()
    }

    async fn is_same_ods_instance(&self, ods_instance_id: i32) -> bool {
        self.status
            .lock()
            .await
            .running_job()
            .is_some_and(|(_, running)| running == ods_instance_id)
    }

    #[tracing::instrument(skip(self, context), fields(job.kind = %self.kind, ods_instance.id = context.ods_instance_id()))]
    async fn enqueue_job(&self, context: C) -> Result<Uuid, AppError> {
        let mut status = self.status.lock().await;
        let job_id = self.claim(&mut status, context)?;
        tracing::info!(job.id = %job_id, "Job enqueued");
        Ok(job_id)
    }

    #[tracing::instrument(skip(self, context), fields(job.kind = %self.kind, ods_instance.id = context.ods_instance_id()))]
    async fn try_enqueue(&self, context: C) -> Result<EnqueueOutcome, AppError> {
        let mut status = self.status.lock().await;

        if let Some((running_job_id, running_instance)) = status.running_job() {
            let same_instance = running_instance == context.ods_instance_id();
            tracing::info!(
                running_job.id = %running_job_id,
                same_instance = same_instance,
                "Job already running, not enqueuing"
            );
            return Ok(EnqueueOutcome::AlreadyRunning { same_instance });
        }

        let job_id = self.claim(&mut status, context)?;
        tracing::info!(job.id = %job_id, "Job enqueued");
        Ok(EnqueueOutcome::Started { job_id })
    }

    async fn status(&self) -> JobStatus {
        self.status.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    #[derive(Debug, Clone)]
    struct TestContext {
        ods_instance_id: i32,
    }

    impl JobContext for TestContext {
        fn kind(&self) -> JobKind {
            JobKind::BulkLoad
        }

        fn ods_instance_id(&self) -> i32 {
            self.ods_instance_id
        }
    }

    /// Blocks every job until the test adds a permit
    struct GateExecutor {
        gate: Arc<Semaphore>,
        executed: Arc<Mutex<Vec<Uuid>>>,
    }

    #[async_trait]
    impl JobExecutor<TestContext> for GateExecutor {
        async fn execute(&self, job_id: Uuid, _context: &TestContext) -> anyhow::Result<()> {
            let permit = self.gate.acquire().await?;
            permit.forget();
            self.executed.lock().await.push(job_id);
            Ok(())
        }
    }

    struct FailingExecutor;

    #[async_trait]
    impl JobExecutor<TestContext> for FailingExecutor {
        async fn execute(&self, _job_id: Uuid, _context: &TestContext) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("bulk loader exited with status 3"))
        }
    }

    fn gated_runner() -> (JobRunner<TestContext>, Arc<Semaphore>, Arc<Mutex<Vec<Uuid>>>) {
        let gate = Arc::new(Semaphore::new(0));
        let executed = Arc::new(Mutex::new(Vec::new()));
        let executor = Arc::new(GateExecutor {
            gate: gate.clone(),
            executed: executed.clone(),
        });
        (JobRunner::new(JobKind::BulkLoad, executor, 8), gate, executed)
    }

    async fn wait_for_status<F>(runner: &JobRunner<TestContext>, predicate: F) -> JobStatus
    where
        F: Fn(&JobStatus) -> bool,
    {
        for _ in 0..500 {
            let status = runner.status().await;
            if predicate(&status) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("runner never reached the expected status");
    }

    #[tokio::test]
    async fn test_try_enqueue_starts_job_when_idle() {
        let (runner, _gate, _executed) = gated_runner();
        assert_eq!(runner.status().await, JobStatus::Idle);
        assert!(!runner.is_job_running().await);

        let outcome = runner
            .try_enqueue(TestContext { ods_instance_id: 1 })
            .await
            .unwrap();

        assert!(matches!(outcome, EnqueueOutcome::Started { .. }));
        assert!(runner.is_job_running().await);
        assert!(runner.is_same_ods_instance(1).await);
        assert!(!runner.is_same_ods_instance(2).await);
    }

    #[tokio::test]
    async fn test_try_enqueue_reports_running_job() {
        let (runner, _gate, _executed) = gated_runner();
        runner
            .try_enqueue(TestContext { ods_instance_id: 1 })
            .await
            .unwrap();

        let same = runner
            .try_enqueue(TestContext { ods_instance_id: 1 })
            .await
            .unwrap();
        assert_eq!(
            same,
            EnqueueOutcome::AlreadyRunning {
                same_instance: true
            }
        );

        let other = runner
            .try_enqueue(TestContext { ods_instance_id: 2 })
            .await
            .unwrap();
        assert_eq!(
            other,
            EnqueueOutcome::AlreadyRunning {
                same_instance: false
            }
        );
    }

    #[tokio::test]
    async fn test_concurrent_try_enqueue_starts_exactly_one() {
        let (runner, _gate, _executed) = gated_runner();
        let runner = Arc::new(runner);

        let mut handles = Vec::new();
        for i in 0..16 {
            let runner = runner.clone();
            handles.push(tokio::spawn(async move {
                runner
                    .try_enqueue(TestContext {
                        ods_instance_id: i % 3,
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut started = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), EnqueueOutcome::Started { .. }) {
                started += 1;
            }
        }
        assert_eq!(started, 1);
    }

    #[tokio::test]
    async fn test_runner_accepts_new_job_after_completion() {
        let (runner, gate, executed) = gated_runner();
        let outcome = runner
            .try_enqueue(TestContext { ods_instance_id: 4 })
            .await
            .unwrap();
        let EnqueueOutcome::Started { job_id } = outcome else {
            panic!("expected the first job to start");
        };

        gate.add_permits(1);
        let status = wait_for_status(&runner, |s| matches!(s, JobStatus::Completed { .. })).await;
        match status {
            JobStatus::Completed {
                job_id: finished,
                ods_instance_id,
                ..
            } => {
                assert_eq!(finished, job_id);
                assert_eq!(ods_instance_id, 4);
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(*executed.lock().await, vec![job_id]);
        assert!(!runner.is_job_running().await);

        let next = runner
            .try_enqueue(TestContext { ods_instance_id: 5 })
            .await
            .unwrap();
        assert!(matches!(next, EnqueueOutcome::Started { .. }));
    }

    #[tokio::test]
    async fn test_failed_job_recorded_in_status() {
        let runner = JobRunner::new(JobKind::BulkLoad, Arc::new(FailingExecutor), 4);
        runner
            .try_enqueue(TestContext { ods_instance_id: 9 })
            .await
            .unwrap();

        let status = wait_for_status(&runner, |s| matches!(s, JobStatus::Failed { .. })).await;
        match status {
            JobStatus::Failed { error, .. } => assert!(error.contains("exited with status 3")),
            other => panic!("unexpected status {:?}", other),
        }
        assert!(!runner.is_job_running().await);
    }

    #[tokio::test]
    async fn test_enqueue_job_runs_jobs_in_order() {
        let (runner, gate, executed) = gated_runner();
        let first = runner
            .enqueue_job(TestContext { ods_instance_id: 1 })
            .await
            .unwrap();
        let second = runner
            .enqueue_job(TestContext { ods_instance_id: 2 })
            .await
            .unwrap();
        assert!(runner.is_same_ods_instance(2).await);

        gate.add_permits(2);
        let status = wait_for_status(&runner, |s| matches!(s, JobStatus::Completed { .. })).await;
        assert!(matches!(status, JobStatus::Completed { job_id, .. } if job_id == second));
        assert_eq!(*executed.lock().await, vec![first, second]);
    }

    #[test]
    fn test_status_serialization() {
        let idle = serde_json::to_value(JobStatus::Idle).unwrap();
        assert_eq!(idle, serde_json::json!({ "state": "idle" }));

        let running = serde_json::to_value(JobStatus::Running {
            job_id: Uuid::nil(),
            ods_instance_id: 3,
            started_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(running["state"], "running");
        assert_eq!(running["ods_instance_id"], 3);
    }
}
