use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// API client credentials the bulk loader authenticates with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadCredential {
    pub api_key: String,
    pub api_secret: String,
}

/// Learning standards provider credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningStandardsCredential {
    pub api_key: String,
    pub api_secret: String,
}

/// Per-instance secret bundle. Persisted encrypted; a store may hold none at all
/// for an instance, which callers see as `None` rather than an empty bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OdsSecretConfiguration {
    #[serde(default)]
    pub bulk_upload_credential: Option<BulkUploadCredential>,
    #[serde(default)]
    pub learning_standards_credential: Option<LearningStandardsCredential>,
}

/// Request DTO for saving bulk load credentials
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SaveBulkUploadCredentialsRequest {
    #[validate(length(min = 1, max = 255, message = "API key is required"))]
    pub api_key: String,
    #[validate(length(min = 1, max = 255, message = "API secret is required"))]
    pub api_secret: String,
}

/// Request DTO for configuring learning standards and starting a sync
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct SaveLearningStandardsRequest {
    #[validate(length(min = 1, max = 255, message = "API key is required"))]
    pub api_key: String,
    #[validate(length(min = 1, max = 255, message = "API secret is required"))]
    pub api_secret: String,
}
