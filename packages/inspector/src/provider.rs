// ABOUTME: Provider trait abstracting the remote sandbox-hosting service
// ABOUTME: Stateless capability interface invoked fresh per call, no persistent handles

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;
use crate::types::{SandboxInfo, SandboxState};

/// Server-side filter for listing sandboxes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SandboxQuery {
    /// Restrict to a single lifecycle state
    pub state: Option<SandboxState>,
    /// Metadata equality filter; all pairs must match
    pub metadata: Option<HashMap<String, String>>,
}

impl SandboxQuery {
    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.metadata.is_none()
    }
}

/// One page of a paginated sandbox listing
#[derive(Debug, Clone, Deserialize)]
pub struct SandboxPage {
    /// Records on this page, in provider order
    #[serde(default)]
    pub sandboxes: Vec<SandboxInfo>,
    /// Whether further pages are available
    #[serde(default)]
    pub has_more: bool,
    /// Opaque cursor for the next page
    pub next_cursor: Option<String>,
}

/// Raw telemetry reading as reported by the provider, byte-denominated
#[derive(Debug, Clone, Deserialize)]
pub struct MetricPoint {
    pub cpu_count: u32,
    pub cpu_used_pct: f64,
    pub mem_total: u64,
    pub mem_used: u64,
    pub disk_total: u64,
    pub disk_used: u64,
    pub timestamp: DateTime<Utc>,
}

/// Raw output of a shell command; streams may be absent
#[derive(Debug, Clone, Deserialize)]
pub struct CommandOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: i32,
}

/// Raw output of a managed code execution
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionOutput {
    /// Stdout log lines in emission order
    #[serde(default)]
    pub stdout: Vec<String>,
    /// Stderr log lines in emission order
    #[serde(default)]
    pub stderr: Vec<String>,
    /// Execution-time error description, if the code failed
    pub error: Option<String>,
    /// Textual representations of returned value objects
    #[serde(default)]
    pub results: Vec<String>,
}

/// File content as returned by the provider's read primitive
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    /// Decoded text
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
}

impl FileContent {
    /// Normalize to bytes; text is re-encoded as UTF-8
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            FileContent::Text(s) => s.into_bytes(),
            FileContent::Bytes(b) => b,
        }
    }
}

/// Abstract operations of the remote sandbox-hosting service.
///
/// Implementations are stateless between calls: every operation resolves its
/// target by id, and no connection handle outlives a single call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Fetch one page of the sandbox listing
    async fn list_page(
        &self,
        query: Option<SandboxQuery>,
        cursor: Option<String>,
    ) -> Result<SandboxPage>;

    /// Fetch the record for a single sandbox
    async fn get_info(&self, sandbox_id: &str) -> Result<SandboxInfo>;

    /// Fetch raw telemetry readings, optionally bounded to a time window
    async fn get_metrics(
        &self,
        sandbox_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<MetricPoint>>;

    /// Run a shell command inside the sandbox
    async fn run_command(
        &self,
        sandbox_id: &str,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput>;

    /// Execute code in the sandbox's managed interpreter
    async fn run_code(
        &self,
        sandbox_id: &str,
        code: &str,
        language: &str,
        timeout: Duration,
    ) -> Result<ExecutionOutput>;

    /// Read a file from the sandbox
    async fn read_file(&self, sandbox_id: &str, path: &str) -> Result<FileContent>;

    /// Write a file into the sandbox
    async fn write_file(&self, sandbox_id: &str, path: &str, content: &[u8]) -> Result<()>;

    /// Terminate the sandbox; NotFound when it is already gone
    async fn terminate(&self, sandbox_id: &str) -> Result<()>;
}
