//! Request extractors

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use odsadmin_core::models::InstanceContext;
use odsadmin_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct InstancePath {
    id: i32,
}

/// The ODS instance named by the `{id}` path segment. Unknown ids are 404.
#[derive(Debug, Clone)]
pub struct ResolvedInstance(pub InstanceContext);

impl FromRequestParts<Arc<AppState>> for ResolvedInstance {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Path(path) = Path::<InstancePath>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                HttpAppError(AppError::InvalidInput(format!(
                    "Invalid ODS instance id: {}",
                    e.body_text()
                )))
            })?;

        let instance = state
            .instances
            .get_instance_context(path.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("ODS instance {} not found", path.id)))?;

        Ok(ResolvedInstance(instance))
    }
}
