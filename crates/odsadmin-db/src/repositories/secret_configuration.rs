use async_trait::async_trait;
use odsadmin_core::models::OdsSecretConfiguration;
use odsadmin_core::{AppError, EncryptionService, OdsSecretConfigurationProvider};
use sqlx::{PgPool, Postgres};

/// Repository for per-instance secret configuration.
///
/// The configuration is stored as one AES-GCM encrypted JSON document per
/// instance; plaintext credentials never reach the database.
#[derive(Clone)]
pub struct SecretConfigurationRepository {
    pool: PgPool,
    encryption: EncryptionService,
}

impl SecretConfigurationRepository {
    pub fn new(pool: PgPool, encryption: EncryptionService) -> Self {
        Self { pool, encryption }
    }
}

#[async_trait]
impl OdsSecretConfigurationProvider for SecretConfigurationRepository {
    #[tracing::instrument(skip(self), fields(db.table = "ods_secret_configurations", db.operation = "select", db.record_id = %ods_instance_id))]
    async fn get_secret_configuration(
        &self,
        ods_instance_id: i32,
    ) -> Result<Option<OdsSecretConfiguration>, AppError> {
        let encrypted = sqlx::query_scalar::<Postgres, String>(
            "SELECT encrypted_configuration FROM ods_secret_configurations WHERE ods_instance_id = $1",
        )
        .bind(ods_instance_id)
        .fetch_optional(&self.pool)
        .await?;

        match encrypted {
            Some(value) => Ok(Some(self.encryption.decrypt_json(&value)?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, configuration), fields(db.table = "ods_secret_configurations", db.operation = "upsert", db.record_id = %ods_instance_id))]
    async fn set_secret_configuration(
        &self,
        ods_instance_id: i32,
        configuration: &OdsSecretConfiguration,
    ) -> Result<(), AppError> {
        let encrypted = self.encryption.encrypt_json(configuration)?;

        sqlx::query(
            r#"
            INSERT INTO ods_secret_configurations (ods_instance_id, encrypted_configuration, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (ods_instance_id)
            DO UPDATE SET encrypted_configuration = EXCLUDED.encrypted_configuration,
                          updated_at = NOW()
            "#,
        )
        .bind(ods_instance_id)
        .bind(&encrypted)
        .execute(&self.pool)
        .await?;

        tracing::debug!(ods_instance_id, "Secret configuration saved");
        Ok(())
    }
}
