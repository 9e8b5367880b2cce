//! Learning standards provider setup and job context construction

use async_trait::async_trait;
use odsadmin_core::models::connection::instance_number_suffix;
use odsadmin_core::models::{
    AcademicBenchmarkConfig, ApiMode, CloudOdsEnvironment, InstanceContext,
    LearningStandardsCredential, LearningStandardsJobContext, OdsApiConnectionInformation,
};
use odsadmin_core::{AppError, OdsSecretConfigurationProvider};
use std::sync::Arc;

/// Stores the learning standards provider configuration for an instance
#[async_trait]
pub trait LearningStandardsSetupCommand: Send + Sync {
    async fn execute(
        &self,
        ods_instance_id: i32,
        config: &AcademicBenchmarkConfig,
    ) -> Result<(), AppError>;
}

/// Setup command that keeps the provider credentials in the secret store
pub struct SecretStoreLearningStandardsSetup {
    secrets: Arc<dyn OdsSecretConfigurationProvider>,
}

impl SecretStoreLearningStandardsSetup {
    pub fn new(secrets: Arc<dyn OdsSecretConfigurationProvider>) -> Self {
        Self { secrets }
    }
}

#[async_trait]
impl LearningStandardsSetupCommand for SecretStoreLearningStandardsSetup {
    #[tracing::instrument(skip(self, config), fields(ods_instance.id = ods_instance_id, api_mode = %config.ods_api_mode))]
    async fn execute(
        &self,
        ods_instance_id: i32,
        config: &AcademicBenchmarkConfig,
    ) -> Result<(), AppError> {
        let mut secret_configuration = self
            .secrets
            .get_secret_configuration(ods_instance_id)
            .await?
            .unwrap_or_default();

        secret_configuration.learning_standards_credential = Some(LearningStandardsCredential {
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        });

        self.secrets
            .set_secret_configuration(ods_instance_id, &secret_configuration)
            .await?;

        tracing::info!("Learning standards provider configured");
        Ok(())
    }
}

/// School year addressed by a year-specific instance (`Ed_Fi_Ods_2024` -> 2024).
fn school_year(api_mode: ApiMode, instance: &InstanceContext) -> Result<Option<i32>, AppError> {
    if api_mode != ApiMode::YearSpecific {
        return Ok(None);
    }

    instance_number_suffix(&instance.name)
        .and_then(|digits| digits.parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Instance '{}' has no school year suffix required in year-specific mode",
                instance.name
            ))
        })
}

pub fn build_job_context(
    environment: CloudOdsEnvironment,
    instance: &InstanceContext,
    connection: &OdsApiConnectionInformation,
) -> Result<LearningStandardsJobContext, AppError> {
    Ok(LearningStandardsJobContext {
        environment: environment.value().to_string(),
        api_url: connection.api_server_url().to_string(),
        ods_instance_id: instance.id,
        school_year: school_year(connection.api_mode(), instance)?,
    })
}
