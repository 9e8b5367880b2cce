use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The ODS instance a request targets. Read-only snapshot resolved at request start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InstanceContext {
    pub id: i32,
    pub name: String,
}

impl InstanceContext {
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Registered ODS instance row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OdsInstance {
    pub id: i32,
    pub name: String,
    pub instance_type: Option<String>,
    pub status: Option<String>,
    pub is_extended: bool,
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OdsInstance> for InstanceContext {
    fn from(instance: OdsInstance) -> Self {
        InstanceContext {
            id: instance.id,
            name: instance.name,
        }
    }
}
