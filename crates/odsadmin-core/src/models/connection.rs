//! ODS API connection information and the deployment enums it depends on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// How the ODS API partitions its data across instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ApiMode {
    Sandbox,
    SharedInstance,
    YearSpecific,
    DistrictSpecific,
}

impl ApiMode {
    /// Single-instance modes address the API without a per-instance route segment.
    pub fn supports_single_instance(&self) -> bool {
        matches!(self, ApiMode::Sandbox | ApiMode::SharedInstance)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMode::Sandbox => "sandbox",
            ApiMode::SharedInstance => "sharedinstance",
            ApiMode::YearSpecific => "yearspecific",
            ApiMode::DistrictSpecific => "districtspecific",
        }
    }
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "sandbox" => Ok(ApiMode::Sandbox),
            "sharedinstance" => Ok(ApiMode::SharedInstance),
            "yearspecific" => Ok(ApiMode::YearSpecific),
            "districtspecific" => Ok(ApiMode::DistrictSpecific),
            other => Err(format!("Unknown ODS API mode '{}'", other)),
        }
    }
}

/// Deployment environment the admin app manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CloudOdsEnvironment {
    Production,
    Staging,
}

impl CloudOdsEnvironment {
    /// Tag carried into job contexts
    pub fn value(&self) -> &'static str {
        match self {
            CloudOdsEnvironment::Production => "Production",
            CloudOdsEnvironment::Staging => "Staging",
        }
    }
}

impl fmt::Display for CloudOdsEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for CloudOdsEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(CloudOdsEnvironment::Production),
            "staging" => Ok(CloudOdsEnvironment::Staging),
            other => Err(format!("Unknown ODS environment '{}'", other)),
        }
    }
}

/// Trailing run of ASCII digits in an instance name (`Ed_Fi_Ods_2024` -> `2024`).
pub fn instance_number_suffix(instance_name: &str) -> Option<&str> {
    let digits = instance_name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        None
    } else {
        Some(&instance_name[instance_name.len() - digits..])
    }
}

/// Connection details for one ODS API instance. Derived URLs are computed from
/// the server URL, the API mode and the instance name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OdsApiConnectionInformation {
    instance_name: String,
    api_mode: ApiMode,
    api_server_url: String,
    client_key: String,
    client_secret: String,
}

impl OdsApiConnectionInformation {
    pub fn new(
        instance_name: impl Into<String>,
        api_mode: ApiMode,
        api_server_url: impl Into<String>,
    ) -> Self {
        let api_server_url: String = api_server_url.into();
        Self {
            instance_name: instance_name.into(),
            api_mode,
            api_server_url: api_server_url.trim_end_matches('/').to_string(),
            client_key: String::new(),
            client_secret: String::new(),
        }
    }

    pub fn with_client_credentials(
        mut self,
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_key = client_key.into();
        self.client_secret = client_secret.into();
        self
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn api_mode(&self) -> ApiMode {
        self.api_mode
    }

    pub fn api_server_url(&self) -> &str {
        &self.api_server_url
    }

    pub fn client_key(&self) -> &str {
        &self.client_key
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Route segment for multi-instance modes (school year or district id).
    fn instance_segment(&self) -> Option<&str> {
        if self.api_mode.supports_single_instance() {
            return None;
        }
        Some(instance_number_suffix(&self.instance_name).unwrap_or(&self.instance_name))
    }

    pub fn api_base_url(&self) -> String {
        match self.instance_segment() {
            Some(segment) => format!("{}/data/v3/{}", self.api_server_url, segment),
            None => format!("{}/data/v3", self.api_server_url),
        }
    }

    pub fn oauth_url(&self) -> String {
        format!("{}/oauth/token", self.api_server_url)
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/metadata", self.api_server_url)
    }

    pub fn dependencies_url(&self) -> String {
        match self.instance_segment() {
            Some(segment) => format!(
                "{}/metadata/data/v3/{}/dependencies",
                self.api_server_url, segment
            ),
            None => format!("{}/metadata/data/v3/dependencies", self.api_server_url),
        }
    }
}
