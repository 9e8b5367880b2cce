//! Configuration module
//!
//! Configuration is read once from the environment (and an optional `.env` file)
//! at startup and passed explicitly to the components that need it.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_BULK_UPLOAD_MAX_BYTES;
use crate::models::{ApiMode, CloudOdsEnvironment};

const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const VERSION_PROBE_TIMEOUT_SECS: u64 = 10;
const JOB_QUEUE_SIZE: usize = 16;

/// HTTP server and database pool settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_json: bool,
}

/// Admin app settings
#[derive(Clone, Debug)]
pub struct AdminAppConfig {
    pub base: ServerConfig,
    pub database_url: String,
    /// Root URL of the ODS API this admin app manages
    pub ods_api_url: String,
    pub api_mode: ApiMode,
    pub cloud_ods_environment: CloudOdsEnvironment,
    pub bulk_upload_max_bytes: u64,
    pub upload_directory: PathBuf,
    /// Folder holding one XSD directory per Ed-Fi data standard version
    pub xsd_folder: PathBuf,
    /// Base64-encoded 32-byte key for secret configuration at rest
    pub encryption_key: String,
    pub bulk_load_client_path: Option<PathBuf>,
    pub learning_standards_client_path: Option<PathBuf>,
    pub version_probe_timeout_secs: u64,
    pub job_queue_size: usize,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config(pub Box<AdminAppConfig>);

impl Config {
    fn inner(&self) -> &AdminAppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AdminAppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_json(&self) -> bool {
        self.inner().base.log_json
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn ods_api_url(&self) -> &str {
        &self.inner().ods_api_url
    }

    pub fn api_mode(&self) -> ApiMode {
        self.inner().api_mode
    }

    pub fn cloud_ods_environment(&self) -> CloudOdsEnvironment {
        self.inner().cloud_ods_environment
    }

    pub fn bulk_upload_max_bytes(&self) -> u64 {
        self.inner().bulk_upload_max_bytes
    }

    pub fn upload_directory(&self) -> &Path {
        &self.inner().upload_directory
    }

    pub fn xsd_folder(&self) -> &Path {
        &self.inner().xsd_folder
    }

    pub fn encryption_key(&self) -> &str {
        &self.inner().encryption_key
    }

    pub fn bulk_load_client_path(&self) -> Option<&Path> {
        self.inner().bulk_load_client_path.as_deref()
    }

    pub fn learning_standards_client_path(&self) -> Option<&Path> {
        self.inner().learning_standards_client_path.as_deref()
    }

    pub fn version_probe_timeout_secs(&self) -> u64 {
        self.inner().version_probe_timeout_secs
    }

    pub fn job_queue_size(&self) -> usize {
        self.inner().job_queue_size
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

impl AdminAppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = ServerConfig {
            server_port: env::var("SERVER_PORT")
                .or_else(|_| env::var("PORT"))
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("SERVER_PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let api_mode = env::var("ODS_API_MODE")
            .unwrap_or_else(|_| "sandbox".to_string())
            .parse::<ApiMode>()
            .map_err(|e| anyhow::anyhow!("ODS_API_MODE: {}", e))?;

        let cloud_ods_environment = env::var("CLOUD_ODS_ENVIRONMENT")
            .unwrap_or_else(|_| "production".to_string())
            .parse::<CloudOdsEnvironment>()
            .map_err(|e| anyhow::anyhow!("CLOUD_ODS_ENVIRONMENT: {}", e))?;

        Ok(AdminAppConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            ods_api_url: env::var("ODS_API_URL")
                .map_err(|_| anyhow::anyhow!("ODS_API_URL must be set"))?,
            api_mode,
            cloud_ods_environment,
            bulk_upload_max_bytes: env_or("BULK_UPLOAD_MAX_BYTES", DEFAULT_BULK_UPLOAD_MAX_BYTES),
            upload_directory: env_path("UPLOAD_DIRECTORY")
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            xsd_folder: env_path("XSD_FOLDER").unwrap_or_else(|| PathBuf::from("./Schema")),
            encryption_key: env::var("ENCRYPTION_KEY")
                .map_err(|_| anyhow::anyhow!("ENCRYPTION_KEY must be set"))?,
            bulk_load_client_path: env_path("BULK_LOAD_CLIENT_PATH"),
            learning_standards_client_path: env_path("LEARNING_STANDARDS_CLIENT_PATH"),
            version_probe_timeout_secs: env_or(
                "VERSION_PROBE_TIMEOUT_SECS",
                VERSION_PROBE_TIMEOUT_SECS,
            ),
            job_queue_size: env_or("JOB_QUEUE_SIZE", JOB_QUEUE_SIZE).max(1),
        })
    }
}
