pub mod bulk_upload;
pub mod connection;
pub mod executors;
pub mod learning_standards;
pub mod version;

pub use connection::{ApiConnectionInformationProvider, ConfiguredConnectionProvider};
pub use learning_standards::{LearningStandardsSetupCommand, SecretStoreLearningStandardsSetup};
pub use version::{HttpOdsApiVersionInference, InferOdsApiVersion};
