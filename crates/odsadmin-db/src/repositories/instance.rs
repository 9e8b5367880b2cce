use async_trait::async_trait;
use odsadmin_core::models::{InstanceContext, OdsInstance};
use odsadmin_core::{AppError, OdsInstanceLookup};
use sqlx::{PgPool, Postgres};

/// Repository for registered ODS instances
#[derive(Clone)]
pub struct OdsInstanceRepository {
    pool: PgPool,
}

impl OdsInstanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get instance by ID
    #[tracing::instrument(skip(self), fields(db.table = "ods_instances", db.operation = "select", db.record_id = %id))]
    pub async fn get_instance(&self, id: i32) -> Result<Option<OdsInstance>, AppError> {
        let instance = sqlx::query_as::<Postgres, OdsInstance>(
            r#"
            SELECT id, name, instance_type, status, is_extended, version, created_at
            FROM ods_instances
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(instance)
    }
}

#[async_trait]
impl OdsInstanceLookup for OdsInstanceRepository {
    async fn get_instance_context(
        &self,
        ods_instance_id: i32,
    ) -> Result<Option<InstanceContext>, AppError> {
        Ok(self
            .get_instance(ods_instance_id)
            .await?
            .map(InstanceContext::from))
    }
}
