//! ODS API version inference
//!
//! The API root document reports the product version and the data models it
//! serves, e.g. `{"version": "5.0.0", "dataModels": [{"name": "Ed-Fi", "version": "3.2.0-c"}]}`.
//! Root documents are cached per URL for `ROOT_CACHE_TTL`, so an upgraded ODS
//! API is picked up without a restart.

use async_trait::async_trait;
use lru::LruCache;
use odsadmin_core::constants::EDFI_DATA_MODEL_NAME;
use odsadmin_core::AppError;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const ROOT_CACHE_CAPACITY: usize = 32;

const ROOT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Probes an ODS API for its versions
#[async_trait]
pub trait InferOdsApiVersion: Send + Sync {
    /// Product version of the ODS API, e.g. `5.0.0`
    async fn version(&self, api_server_url: &str) -> Result<String, AppError>;

    /// Ed-Fi data standard version served by the API, e.g. `3.2.0-c`
    async fn edfi_standard_version(&self, api_server_url: &str) -> Result<String, AppError>;
}

#[derive(Debug, Clone, Deserialize)]
struct DataModel {
    name: String,
    version: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OdsApiRoot {
    version: String,
    #[serde(default)]
    data_models: Vec<DataModel>,
}

#[derive(Debug, Clone)]
struct CachedRoot {
    fetched_at: Instant,
    root: OdsApiRoot,
}

/// Version inference over HTTP
pub struct HttpOdsApiVersionInference {
    http_client: reqwest::Client,
    cache: Mutex<LruCache<String, CachedRoot>>,
    cache_ttl: Duration,
}

impl HttpOdsApiVersionInference {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for ODS API: {}", e))?;

        let capacity = NonZeroUsize::new(ROOT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);

        Ok(Self {
            http_client,
            cache: Mutex::new(LruCache::new(capacity)),
            cache_ttl: ROOT_CACHE_TTL,
        })
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    fn normalize(api_server_url: &str) -> String {
        api_server_url.trim_end_matches('/').to_string()
    }

    async fn root(&self, api_server_url: &str) -> Result<OdsApiRoot, AppError> {
        let url = Self::normalize(api_server_url);

        let fresh = self
            .cache
            .lock()
            .await
            .get(&url)
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(|cached| cached.root.clone());
        if let Some(root) = fresh {
            return Ok(root);
        }

        let root = self.fetch_root(&url).await?;
        self.cache.lock().await.put(
            url,
            CachedRoot {
                fetched_at: Instant::now(),
                root: root.clone(),
            },
        );
        Ok(root)
    }

    async fn forget(&self, api_server_url: &str) {
        self.cache.lock().await.pop(&Self::normalize(api_server_url));
    }

    #[tracing::instrument(skip(self), fields(http.url = %url))]
    async fn fetch_root(&self, url: &str) -> Result<OdsApiRoot, AppError> {
        let response = self
            .http_client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("ODS API at {} is unreachable: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamApi(format!(
                "ODS API at {} answered {}",
                url, status
            )));
        }

        let root = response.json::<OdsApiRoot>().await.map_err(|e| {
            AppError::UpstreamApi(format!("ODS API at {} returned an invalid root document: {}", url, e))
        })?;

        tracing::debug!(version = %root.version, data_models = root.data_models.len(), "ODS API root fetched");
        Ok(root)
    }
}

#[async_trait]
impl InferOdsApiVersion for HttpOdsApiVersionInference {
    async fn version(&self, api_server_url: &str) -> Result<String, AppError> {
        Ok(self.root(api_server_url).await?.version)
    }

    async fn edfi_standard_version(&self, api_server_url: &str) -> Result<String, AppError> {
        let root = self.root(api_server_url).await?;
        let version = root
            .data_models
            .into_iter()
            .find(|model| model.name.eq_ignore_ascii_case(EDFI_DATA_MODEL_NAME))
            .map(|model| model.version);

        match version {
            Some(version) => Ok(version),
            None => {
                // Likely mid-deployment; ask again next time
                self.forget(api_server_url).await;
                Err(AppError::UpstreamApi(format!(
                    "ODS API at {} does not report an {} data model",
                    api_server_url, EDFI_DATA_MODEL_NAME
                )))
            }
        }
    }
}
