//! Job contexts submitted to the background job runners.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use utoipa::ToSchema;

use super::connection::ApiMode;

/// Kind of background job, one runner per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    BulkLoad,
    LearningStandards,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::BulkLoad => "bulk-load",
            JobKind::LearningStandards => "learning-standards",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bulk-load" => Ok(JobKind::BulkLoad),
            "learning-standards" => Ok(JobKind::LearningStandards),
            other => Err(format!("Unknown job kind '{}'", other)),
        }
    }
}

/// Unit of work for one bulk XML import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkUploadJobContext {
    pub environment: String,
    pub data_directory_full_path: PathBuf,
    pub ods_instance_id: i32,
    pub api_base_url: String,
    pub oauth_url: String,
    pub metadata_url: String,
    pub dependencies_url: String,
    pub client_key: String,
    pub client_secret: String,
    pub schema_path: PathBuf,
    pub max_simultaneous_requests: u32,
}

/// Unit of work for one learning standards sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LearningStandardsJobContext {
    pub environment: String,
    pub api_url: String,
    pub ods_instance_id: i32,
    /// Only set in year-specific mode
    pub school_year: Option<i32>,
}

/// Learning standards provider configuration applied before a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicBenchmarkConfig {
    pub api_key: String,
    pub api_secret: String,
    pub ods_api_mode: ApiMode,
}
