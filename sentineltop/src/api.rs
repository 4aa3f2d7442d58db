//! Minimal HTTP client for the monitoring API endpoints.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::types::{MetricsSnapshot, PredictionSet, ServerVmsResponse, VmMetricsResponse};

/// Where the poller gets its data from. `ApiClient` in production, scripted sources in tests.
pub trait MetricsSource {
    fn metrics(&self) -> impl Future<Output = FetchResult<MetricsSnapshot>>;
    fn predictions(&self, server: usize) -> impl Future<Output = FetchResult<PredictionSet>>;
    fn server_vms(&self, server: usize) -> impl Future<Output = FetchResult<ServerVmsResponse>>;
    fn vm_metrics(&self) -> impl Future<Output = FetchResult<VmMetricsResponse>>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration, tls_ca: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        if let Some(path) = tls_ca {
            let pem = std::fs::read(path)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }
        Ok(Self {
            http: builder.build()?,
            base: normalize_base(base)?,
            timeout,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> FetchResult<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> FetchResult<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp.bytes().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e)
        }
    }
}

impl MetricsSource for ApiClient {
    async fn metrics(&self) -> FetchResult<MetricsSnapshot> {
        self.get_json("api/metrics/").await
    }

    async fn predictions(&self, server: usize) -> FetchResult<PredictionSet> {
        self.get_json(&format!("api/predictions/{server}/")).await
    }

    async fn server_vms(&self, server: usize) -> FetchResult<ServerVmsResponse> {
        self.get_json(&format!("api/server/{server}/vms/")).await
    }

    async fn vm_metrics(&self) -> FetchResult<VmMetricsResponse> {
        self.get_json("api/vms/metrics/").await
    }
}

// Url::join drops the last path segment unless it ends with '/'
pub fn normalize_base(base: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
