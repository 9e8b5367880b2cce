//! API connection information for the managed ODS API

use odsadmin_core::models::{
    ApiMode, CloudOdsEnvironment, InstanceContext, OdsApiConnectionInformation,
};
use odsadmin_core::AppError;

/// Resolves how to reach the ODS API for an instance
pub trait ApiConnectionInformationProvider: Send + Sync {
    fn get_connection_information_for_environment(
        &self,
        environment: CloudOdsEnvironment,
        instance: &InstanceContext,
    ) -> Result<OdsApiConnectionInformation, AppError>;
}

/// Connection provider backed by startup configuration.
///
/// Production and staging share one API server; the environment only tags the
/// job contexts built from the result.
#[derive(Debug, Clone)]
pub struct ConfiguredConnectionProvider {
    api_server_url: String,
    api_mode: ApiMode,
}

impl ConfiguredConnectionProvider {
    pub fn new(api_server_url: impl Into<String>, api_mode: ApiMode) -> Self {
        Self {
            api_server_url: api_server_url.into(),
            api_mode,
        }
    }
}

impl ApiConnectionInformationProvider for ConfiguredConnectionProvider {
    fn get_connection_information_for_environment(
        &self,
        environment: CloudOdsEnvironment,
        instance: &InstanceContext,
    ) -> Result<OdsApiConnectionInformation, AppError> {
        if self.api_server_url.trim().is_empty() {
            return Err(AppError::Internal(format!(
                "No ODS API URL configured for the {} environment",
                environment
            )));
        }

        Ok(OdsApiConnectionInformation::new(
            instance.name.clone(),
            self.api_mode,
            self.api_server_url.clone(),
        ))
    }
}
