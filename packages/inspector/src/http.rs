// ABOUTME: HTTP implementation of the SandboxProvider capability
// ABOUTME: reqwest-based REST client with per-status error classification

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::api::{ApiErrorBody, CodeRequest, ExecRequest, MetricsEnvelope};
use crate::config::InspectorConfig;
use crate::error::{InspectorError, Result};
use crate::provider::{
    CommandOutput, ExecutionOutput, FileContent, MetricPoint, SandboxPage, SandboxProvider,
    SandboxQuery,
};
use crate::types::SandboxInfo;

/// Base timeout for plain API calls that carry no caller-supplied bound
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Grace added on top of the remote execution bound before the HTTP
/// request itself is abandoned
const EXEC_TIMEOUT_GRACE: Duration = Duration::from_secs(10);

/// HTTP client for the sbxray sandbox-hosting API
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpProvider {
    /// Build a provider from resolved configuration
    pub fn new(config: &InspectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| InspectorError::provider(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, url)
            .header("X-API-Key", &self.api_key)
    }
}

/// Map a non-success response into the error taxonomy
async fn classify_failure(response: Response, context: &str) -> InspectorError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });

    match status {
        StatusCode::NOT_FOUND => InspectorError::not_found(format!("{context}: {message}")),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            InspectorError::Timeout(format!("{context}: {message}"))
        }
        _ => InspectorError::provider(format!("{context}: {status}: {message}")),
    }
}

async fn ensure_success(response: Response, context: &str) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(classify_failure(response, context).await)
    }
}

#[async_trait]
impl SandboxProvider for HttpProvider {
    async fn list_page(
        &self,
        query: Option<SandboxQuery>,
        cursor: Option<String>,
    ) -> Result<SandboxPage> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(query) = &query {
            if let Some(state) = query.state {
                params.push(("state", state.to_string()));
            }
            if let Some(metadata) = &query.metadata {
                params.push(("metadata", serde_json::to_string(metadata)?));
            }
        }
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        let response = self
            .request(Method::GET, "/v1/sandboxes")
            .query(&params)
            .send()
            .await?;
        let response = ensure_success(response, "list sandboxes").await?;
        Ok(response.json::<SandboxPage>().await?)
    }

    async fn get_info(&self, sandbox_id: &str) -> Result<SandboxInfo> {
        let response = self
            .request(Method::GET, &format!("/v1/sandboxes/{sandbox_id}"))
            .send()
            .await?;
        let response = ensure_success(response, sandbox_id).await?;
        Ok(response.json::<SandboxInfo>().await?)
    }

    async fn get_metrics(
        &self,
        sandbox_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricPoint>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(start) = start {
            params.push(("start", start.to_rfc3339()));
        }
        if let Some(end) = end {
            params.push(("end", end.to_rfc3339()));
        }

        let response = self
            .request(Method::GET, &format!("/v1/sandboxes/{sandbox_id}/metrics"))
            .query(&params)
            .send()
            .await?;
        let response = ensure_success(response, sandbox_id).await?;
        Ok(response.json::<MetricsEnvelope>().await?.metrics)
    }

    async fn run_command(
        &self,
        sandbox_id: &str,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        debug!(sandbox_id, command, "running shell command");
        let response = self
            .request(Method::POST, &format!("/v1/sandboxes/{sandbox_id}/exec"))
            .timeout(timeout + EXEC_TIMEOUT_GRACE)
            .json(&ExecRequest {
                command,
                timeout_secs: timeout.as_secs(),
            })
            .send()
            .await?;
        let response = ensure_success(response, sandbox_id).await?;
        Ok(response.json::<CommandOutput>().await?)
    }

    async fn run_code(
        &self,
        sandbox_id: &str,
        code: &str,
        language: &str,
        timeout: Duration,
    ) -> Result<ExecutionOutput> {
        debug!(sandbox_id, language, "running code");
        let response = self
            .request(Method::POST, &format!("/v1/sandboxes/{sandbox_id}/code"))
            .timeout(timeout + EXEC_TIMEOUT_GRACE)
            .json(&CodeRequest {
                code,
                language,
                timeout_secs: timeout.as_secs(),
            })
            .send()
            .await?;
        let response = ensure_success(response, sandbox_id).await?;
        Ok(response.json::<ExecutionOutput>().await?)
    }

    async fn read_file(&self, sandbox_id: &str, path: &str) -> Result<FileContent> {
        let response = self
            .request(Method::GET, &format!("/v1/sandboxes/{sandbox_id}/files"))
            .query(&[("path", path)])
            .send()
            .await?;
        let response = ensure_success(response, sandbox_id).await?;

        let is_text = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/"))
            .unwrap_or(false);

        if is_text {
            Ok(FileContent::Text(response.text().await?))
        } else {
            Ok(FileContent::Bytes(response.bytes().await?.to_vec()))
        }
    }

    async fn write_file(&self, sandbox_id: &str, path: &str, content: &[u8]) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("/v1/sandboxes/{sandbox_id}/files"))
            .query(&[("path", path)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_vec())
            .send()
            .await?;
        ensure_success(response, sandbox_id).await?;
        Ok(())
    }

    async fn terminate(&self, sandbox_id: &str) -> Result<()> {
        debug!(sandbox_id, "terminating sandbox");
        let response = self
            .request(Method::DELETE, &format!("/v1/sandboxes/{sandbox_id}"))
            .send()
            .await?;
        ensure_success(response, sandbox_id).await?;
        Ok(())
    }
}
