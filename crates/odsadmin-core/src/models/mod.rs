pub mod connection;
pub mod instance;
pub mod jobs;
pub mod secret;
pub mod upload;

pub use connection::{ApiMode, CloudOdsEnvironment, OdsApiConnectionInformation};
pub use instance::{InstanceContext, OdsInstance};
pub use jobs::{
    AcademicBenchmarkConfig, BulkUploadJobContext, JobKind, LearningStandardsJobContext,
};
pub use secret::{
    BulkUploadCredential, LearningStandardsCredential, OdsSecretConfiguration,
    SaveBulkUploadCredentialsRequest, SaveLearningStandardsRequest,
};
pub use upload::{BulkFileUploadModel, FileUploadResult, MessageResponse};
