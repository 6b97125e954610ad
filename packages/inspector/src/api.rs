// ABOUTME: Wire request and response models for the sbxray REST API
// ABOUTME: Serialization shapes only; normalization into public types happens in the facade

use serde::{Deserialize, Serialize};

use crate::provider::MetricPoint;

/// Body for `POST /v1/sandboxes/{id}/exec`
#[derive(Debug, Serialize)]
pub(crate) struct ExecRequest<'a> {
    pub command: &'a str,
    pub timeout_secs: u64,
}

/// Body for `POST /v1/sandboxes/{id}/code`
#[derive(Debug, Serialize)]
pub(crate) struct CodeRequest<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub timeout_secs: u64,
}

/// Body of `GET /v1/sandboxes/{id}/metrics`
#[derive(Debug, Deserialize)]
pub(crate) struct MetricsEnvelope {
    #[serde(default)]
    pub metrics: Vec<MetricPoint>,
}

/// Standard error body returned by the API on failures
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}
