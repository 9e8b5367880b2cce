//! Job executors that run the external bulk loader and learning standards programs

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use odsadmin_core::models::{BulkUploadJobContext, LearningStandardsJobContext};
use odsadmin_storage::FileUploadHandler;
use odsadmin_worker::JobExecutor;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use uuid::Uuid;

/// Longest stderr excerpt carried into a failed job's status
const STDERR_EXCERPT_CHARS: usize = 2000;

const ENVIRONMENT_VAR: &str = "ODS_ENVIRONMENT";

/// Bulk loader client secret; kept off the command line
const CLIENT_SECRET_VAR: &str = "ODS_API_CLIENT_SECRET";

pub fn bulk_load_arguments(context: &BulkUploadJobContext) -> Vec<OsString> {
    vec![
        "--data".into(),
        context.data_directory_full_path.clone().into(),
        "--baseUrl".into(),
        context.api_base_url.clone().into(),
        "--oauthUrl".into(),
        context.oauth_url.clone().into(),
        "--metadataUrl".into(),
        context.metadata_url.clone().into(),
        "--dependenciesUrl".into(),
        context.dependencies_url.clone().into(),
        "--key".into(),
        context.client_key.clone().into(),
        "--xsd".into(),
        context.schema_path.clone().into(),
        "--maxRequests".into(),
        context.max_simultaneous_requests.to_string().into(),
    ]
}

pub fn learning_standards_arguments(context: &LearningStandardsJobContext) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--apiUrl".into(),
        context.api_url.clone().into(),
        "--odsInstanceId".into(),
        context.ods_instance_id.to_string().into(),
    ];
    if let Some(year) = context.school_year {
        args.push("--schoolYear".into());
        args.push(year.to_string().into());
    }
    args
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_EXCERPT_CHARS);
    text.chars().skip(skip).collect()
}

fn bulk_load_command(program: &Path, context: &BulkUploadJobContext) -> Command {
    let mut command = Command::new(program);
    command
        .args(bulk_load_arguments(context))
        .env(ENVIRONMENT_VAR, &context.environment)
        .env(CLIENT_SECRET_VAR, &context.client_secret);
    command
}

fn learning_standards_command(program: &Path, context: &LearningStandardsJobContext) -> Command {
    let mut command = Command::new(program);
    command
        .args(learning_standards_arguments(context))
        .env(ENVIRONMENT_VAR, &context.environment);
    command
}

/// Run a command to completion; a non-zero exit is an error carrying stderr.
async fn run_program(program: &Path, mut command: Command) -> Result<()> {
    let output = command
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to start {}", program.display()))?;

    tracing::debug!(
        program = %program.display(),
        stdout_bytes = output.stdout.len(),
        stderr_bytes = output.stderr.len(),
        "Program exited"
    );

    if output.status.success() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} exited with {}: {}",
            program.display(),
            output.status,
            stderr_excerpt(&output.stderr)
        ))
    }
}

/// Runs the bulk load client for each bulk upload job, then removes the
/// job's upload directory whatever the outcome
pub struct BulkLoadClientExecutor {
    program: Option<PathBuf>,
    uploads: Arc<dyn FileUploadHandler>,
}

impl BulkLoadClientExecutor {
    pub fn new(program: Option<PathBuf>, uploads: Arc<dyn FileUploadHandler>) -> Self {
        Self { program, uploads }
    }

    async fn run(&self, job_id: Uuid, context: &BulkUploadJobContext) -> Result<()> {
        let program = self
            .program
            .as_deref()
            .ok_or_else(|| anyhow!("BULK_LOAD_CLIENT_PATH is not configured"))?;

        tracing::info!(
            job.id = %job_id,
            data_directory = %context.data_directory_full_path.display(),
            api_base_url = %context.api_base_url,
            max_simultaneous_requests = context.max_simultaneous_requests,
            "Running bulk load client"
        );

        run_program(program, bulk_load_command(program, context)).await
    }
}

#[async_trait]
impl JobExecutor<BulkUploadJobContext> for BulkLoadClientExecutor {
    async fn execute(&self, job_id: Uuid, context: &BulkUploadJobContext) -> Result<()> {
        let result = self.run(job_id, context).await;

        if let Err(e) = self
            .uploads
            .remove_directory(&context.data_directory_full_path)
            .await
        {
            tracing::warn!(
                job.id = %job_id,
                error = %e,
                directory = %context.data_directory_full_path.display(),
                "Failed to remove upload directory"
            );
        }

        result
    }
}

/// Runs the learning standards sync for each learning standards job
pub struct LearningStandardsClientExecutor {
    program: Option<PathBuf>,
}

impl LearningStandardsClientExecutor {
    pub fn new(program: Option<PathBuf>) -> Self {
        Self { program }
    }
}

#[async_trait]
impl JobExecutor<LearningStandardsJobContext> for LearningStandardsClientExecutor {
    async fn execute(&self, job_id: Uuid, context: &LearningStandardsJobContext) -> Result<()> {
        let program = self
            .program
            .as_deref()
            .ok_or_else(|| anyhow!("LEARNING_STANDARDS_CLIENT_PATH is not configured"))?;

        tracing::info!(
            job.id = %job_id,
            api_url = %context.api_url,
            school_year = ?context.school_year,
            "Running learning standards sync"
        );

        run_program(program, learning_standards_command(program, context)).await
    }
}
