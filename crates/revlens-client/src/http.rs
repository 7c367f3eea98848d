//! HTTP client for the review classification backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use revlens_core::AnalyzeResponse;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::{Backend, FileSubmission, TextSubmission};
use crate::error::{ClientError, server_message};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Answer from `GET /api/ping`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    #[serde(default)]
    pub ok: bool,
    /// Unix seconds on the backend.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub decision_method: Option<String>,
}

impl Health {
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// HTTP client for the backend's `/api/analyze_*` and `/api/ping` endpoints.
pub struct ClassifierClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    /// Create a client for the given backend base URL.
    ///
    /// `base_url` should be like `http://localhost:8000`; a trailing slash is dropped.
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a preconfigured `reqwest::Client` (timeouts, proxies).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the backend is up and its model is loaded.
    pub async fn ping(&self) -> Result<Health, ClientError> {
        let url = format!("{}/api/ping", self.base_url);
        info!(url = %url, "pinging classification backend");
        let resp = check_status(self.client.get(&url).send().await?).await?;
        let health: Health = serde_json::from_slice(&resp.bytes().await?)?;
        info!(model_loaded = health.model_loaded, "backend healthy");
        Ok(health)
    }
}

#[async_trait]
impl Backend for ClassifierClient {
    async fn analyze_text(&self, request: &TextSubmission) -> Result<AnalyzeResponse, ClientError> {
        let url = format!("{}/api/analyze_text", self.base_url);
        info!(url = %url, chars = request.text.chars().count(), "analyzing text");
        let resp = self.client.post(&url).json(request).send().await?;
        read_results(resp).await
    }

    async fn analyze_file(&self, request: &FileSubmission) -> Result<AnalyzeResponse, ClientError> {
        let url = format!("{}/api/analyze_file", self.base_url);
        let form = upload_form(request).await?;
        info!(url = %url, file = %request.path.display(), "uploading review file");
        let resp = self.client.post(&url).multipart(form).send().await?;
        read_results(resp).await
    }
}

async fn upload_form(request: &FileSubmission) -> Result<Form, ClientError> {
    let bytes = tokio::fs::read(&request.path)
        .await
        .map_err(|source| ClientError::Io {
            path: request.path.clone(),
            source,
        })?;
    let mut form = Form::new().part("file", Part::bytes(bytes).file_name(request.file_name()));
    for (name, value) in request.columns.form_fields() {
        form = form.text(name, value.to_string());
    }
    Ok(form)
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Server {
        status: status.as_u16(),
        message: server_message(&body),
    })
}

async fn read_results(resp: reqwest::Response) -> Result<AnalyzeResponse, ClientError> {
    let resp = check_status(resp).await?;
    let body = resp.bytes().await?;
    let parsed = AnalyzeResponse::from_slice(&body)?;
    info!(count = parsed.results.len(), "received results");
    Ok(parsed)
}
