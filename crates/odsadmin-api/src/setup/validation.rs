//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use odsadmin_core::{Config, EncryptionService};

/// Validate critical configuration values. Fails fast on anything that would
/// only surface later as a failed request or a failed job.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - \
            set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.bulk_upload_max_bytes() == 0 {
        return Err(anyhow::anyhow!("BULK_UPLOAD_MAX_BYTES cannot be 0"));
    }

    if config.version_probe_timeout_secs() == 0 {
        return Err(anyhow::anyhow!("VERSION_PROBE_TIMEOUT_SECS cannot be 0"));
    }

    let ods_api_url = config.ods_api_url();
    if !(ods_api_url.starts_with("http://") || ods_api_url.starts_with("https://")) {
        return Err(anyhow::anyhow!(
            "ODS_API_URL must be an http(s) URL, got '{}'",
            ods_api_url
        ));
    }

    EncryptionService::from_base64_key(config.encryption_key()).map_err(|e| {
        anyhow::anyhow!("ENCRYPTION_KEY must be a base64-encoded 32-byte key: {}", e)
    })?;

    if !config.xsd_folder().is_dir() {
        tracing::warn!(
            xsd_folder = %config.xsd_folder().display(),
            "XSD folder does not exist - bulk load jobs will fail schema validation"
        );
    }

    if config.bulk_load_client_path().is_none() {
        tracing::warn!("BULK_LOAD_CLIENT_PATH not set - bulk load jobs will fail");
    }

    if config.learning_standards_client_path().is_none() {
        tracing::warn!("LEARNING_STANDARDS_CLIENT_PATH not set - learning standards jobs will fail");
    }

    Ok(())
}
