use async_trait::async_trait;
use fortimap::RemoteRecord;
use reqwest::header::AUTHORIZATION;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use url::Url;

use super::error::ApiError;
use super::response::{CmdbEnvelope, FortiosResponseHandler};
use super::CmdbClient;

/// FortiOS REST API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    firmware_version: RwLock<Option<String>>,
    /// Set once the status endpoint was asked, whatever it answered
    status_lookup: OnceCell<()>,
}

#[derive(Clone)]
pub struct ClientConfig {
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 250,
        }
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(endpoint: &str, api_token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(endpoint, api_token, insecure, ClientConfig::default())
    }

    pub fn with_config(
        endpoint: &str,
        api_token: &str,
        insecure: bool,
        config: ClientConfig,
    ) -> Result<Self, ApiError> {
        let base_url = normalize_endpoint(endpoint)?;

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header: format!("Bearer {}", api_token),
                firmware_version: RwLock::new(None),
                status_lookup: OnceCell::new(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn object_url(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Url, ApiError> {
        let mut raw = format!("{}/api/v2/cmdb/{}", self.inner.base_url, path);
        if let Some(mkey) = mkey {
            raw.push('/');
            raw.push_str(&urlencoding::encode(mkey));
        }

        let mut url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if let Some(vdom) = vdom.filter(|v| !v.is_empty()) {
            url.query_pairs_mut().append_pair("vdom", vdom);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<CmdbEnvelope, ApiError> {
        let response = request
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        let envelope = FortiosResponseHandler::extract_envelope(response).await?;
        if let Some(version) = envelope.version.as_ref().filter(|v| !v.is_empty()) {
            let mut cached = self.inner.firmware_version.write().await;
            if cached.as_deref() != Some(version.as_str()) {
                tracing::debug!("Device reports firmware version {}", version);
                *cached = Some(version.clone());
            }
        }
        Ok(envelope)
    }

    /// Ask the device for its firmware version without touching the CMDB
    pub async fn fetch_version(&self) -> Result<Option<String>, ApiError> {
        let url = format!("{}/api/v2/monitor/system/status", self.inner.base_url);
        tracing::debug!("GET request to: {}", url);

        let envelope = self.send(self.inner.http_client.get(&url)).await?;
        Ok(envelope.version)
    }
}

#[async_trait]
impl CmdbClient for Client {
    async fn create(
        &self,
        path: &str,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        let url = self.object_url(path, None, vdom)?;
        tracing::debug!("POST request to: {}", url);

        let envelope = self
            .send(self.inner.http_client.post(url).json(payload))
            .await?;
        Ok(envelope.mkey_string())
    }

    async fn read(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<Option<RemoteRecord>, ApiError> {
        let url = self.object_url(path, mkey, vdom)?;
        tracing::debug!("GET request to: {}", url);

        match self.send(self.inner.http_client.get(url)).await {
            Ok(envelope) => envelope.first_result(),
            Err(ApiError::NotFound(message)) => {
                tracing::debug!("Object {} not found: {}", path, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update(
        &self,
        path: &str,
        mkey: Option<&str>,
        payload: &RemoteRecord,
        vdom: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.object_url(path, mkey, vdom)?;
        tracing::debug!("PUT request to: {}", url);

        self.send(self.inner.http_client.put(url).json(payload))
            .await?;
        Ok(())
    }

    async fn delete(
        &self,
        path: &str,
        mkey: Option<&str>,
        vdom: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.object_url(path, mkey, vdom)?;
        tracing::debug!("DELETE request to: {}", url);

        self.send(self.inner.http_client.delete(url)).await?;
        Ok(())
    }

    async fn version(&self) -> Option<String> {
        if let Some(version) = self.inner.firmware_version.read().await.clone() {
            return Some(version);
        }

        // A failed lookup stays failed until a CMDB response reports a version
        self.inner
            .status_lookup
            .get_or_init(|| async {
                match self.fetch_version().await {
                    Ok(Some(_)) => {}
                    Ok(None) => tracing::warn!("Device status did not report a firmware version"),
                    Err(e) => tracing::warn!("Could not determine firmware version: {}", e),
                }
            })
            .await;

        self.inner.firmware_version.read().await.clone()
    }
}

/// Accepts `host`, `host:port` or a full URL; bare hosts get `https://`
fn normalize_endpoint(endpoint: &str) -> Result<String, ApiError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::InvalidUrl("hostname is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(endpoint.to_string()));
    }

    Ok(candidate)
}
