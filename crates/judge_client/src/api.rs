use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use judge_core::ProducerFailure;
use judge_logging::judge_debug;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::producer::Producer;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 8 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("http client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Thin JSON client for the judge REST service.
///
/// Every failure is reported as a [`ProducerFailure`]; non-2xx responses keep
/// their status and parsed body so a server-supplied `message` reaches the UI.
#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    base_url: Url,
    max_bytes: u64,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut raw = settings.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|source| ApiError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_bytes: settings.max_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProducerFailure> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| {
                ProducerFailure::message(format!("invalid request path {path}: {err}"))
            })?;
        judge_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
        }

        if !status.is_success() {
            let data = serde_json::from_slice(&body).unwrap_or(Value::Null);
            return Err(ProducerFailure::structured(
                Some(status.as_u16()),
                data,
                format!("Request failed with status code {}", status.as_u16()),
            ));
        }

        serde_json::from_slice(&body)
            .map_err(|err| ProducerFailure::message(format!("invalid response body: {err}")))
    }

    fn too_large(&self, actual: u64) -> ProducerFailure {
        ProducerFailure::message(format!(
            "response too large (max {} bytes, got {actual})",
            self.max_bytes
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProducerFailure {
    if err.is_timeout() {
        return ProducerFailure::message("The request timed out.");
    }
    ProducerFailure::message(err.to_string())
}

/// GET of one JSON endpoint, usable as a resource producer.
pub struct ApiProducer<T> {
    api: Arc<ReqwestApi>,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ApiProducer<T> {
    pub fn new(api: Arc<ReqwestApi>, path: impl Into<String>) -> Self {
        Self {
            api,
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait::async_trait]
impl<T> Producer<T> for ApiProducer<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn produce(&self) -> Result<T, ProducerFailure> {
        self.api.get_json(&self.path).await
    }
}
