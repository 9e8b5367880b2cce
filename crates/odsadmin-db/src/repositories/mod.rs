// ODS instance registry
pub mod instance;
//
// Encrypted per-instance secret configuration
pub mod secret_configuration;

pub use instance::OdsInstanceRepository;
pub use secret_configuration::SecretConfigurationRepository;
