use serde::Serialize;
use std::path::PathBuf;
use utoipa::ToSchema;

use super::connection::CloudOdsEnvironment;
use super::secret::OdsSecretConfiguration;

/// Where the upload handler put the files of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadResult {
    pub directory: PathBuf,
    pub file_names: Vec<String>,
}

/// Bulk load view model, built fresh per request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkFileUploadModel {
    pub cloud_ods_environment: CloudOdsEnvironment,
    pub api_key: String,
    pub api_secret: String,
    pub credentials_saved: bool,
    pub is_job_running: bool,
    pub is_same_ods_instance: bool,
}

impl BulkFileUploadModel {
    pub fn from_secret_configuration(
        environment: CloudOdsEnvironment,
        config: &OdsSecretConfiguration,
    ) -> Self {
        let (api_key, api_secret) = config
            .bulk_upload_credential
            .as_ref()
            .map(|c| (c.api_key.clone(), c.api_secret.clone()))
            .unwrap_or_default();

        Self {
            cloud_ods_environment: environment,
            api_key,
            api_secret,
            credentials_saved: config.bulk_upload_credential.is_some(),
            is_job_running: false,
            is_same_ods_instance: false,
        }
    }

    pub fn with_job_status(mut self, is_job_running: bool, is_same_ods_instance: bool) -> Self {
        self.is_job_running = is_job_running;
        self.is_same_ods_instance = is_same_ods_instance;
        self
    }
}

/// Plain confirmation body
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BulkUploadCredential;

    #[test]
    fn test_model_without_credentials() {
        let model = BulkFileUploadModel::from_secret_configuration(
            CloudOdsEnvironment::Production,
            &OdsSecretConfiguration::default(),
        );
        assert!(model.api_key.is_empty());
        assert!(model.api_secret.is_empty());
        assert!(!model.credentials_saved);
    }

    #[test]
    fn test_model_with_credentials() {
        let config = OdsSecretConfiguration {
            bulk_upload_credential: Some(BulkUploadCredential {
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
            }),
            learning_standards_credential: None,
        };
        let model = BulkFileUploadModel::from_secret_configuration(
            CloudOdsEnvironment::Production,
            &config,
        )
        .with_job_status(true, false);
        assert_eq!(model.api_key, "key");
        assert_eq!(model.api_secret, "secret");
        assert!(model.credentials_saved);
        assert!(model.is_job_running);
        assert!(!model.is_same_ods_instance);
    }
}
