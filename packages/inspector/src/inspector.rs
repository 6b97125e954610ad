// ABOUTME: The sandbox control and telemetry facade
// ABOUTME: Normalizes listing, metrics, execution, file transfer, and lifecycle operations

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::InspectorConfig;
use crate::error::{InspectorError, Result};
use crate::http::HttpProvider;
use crate::provider::{MetricPoint, SandboxProvider, SandboxQuery};
use crate::types::{
    CodeResult, CommandResult, FileInfo, MetricsResponse, SandboxInfo, SandboxMetrics,
    SandboxState, Summary,
};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Client for inspecting and controlling remote sandboxes.
///
/// Holds no connection state between calls: every operation resolves its
/// target fresh through the provider, so a single instance is safe to use
/// from concurrent call sites.
///
/// ```no_run
/// # async fn demo() -> sbxray_inspector::Result<()> {
/// use sbxray_inspector::SandboxInspector;
///
/// let inspector = SandboxInspector::new(None)?;
/// let sandboxes = inspector.list_sandboxes(None, None).await?;
/// let result = inspector.exec("sbx_abc", "ls -la", None).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SandboxInspector {
    provider: Arc<dyn SandboxProvider>,
    default_timeout: Duration,
}

impl SandboxInspector {
    /// Create an inspector talking to the hosted API.
    ///
    /// The API key is taken from the argument or the `SBXRAY_API_KEY`
    /// environment variable; absence of both fails before any network access.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let config = InspectorConfig::resolve(api_key)?;
        Self::from_config(&config)
    }

    /// Create an inspector from resolved configuration
    pub fn from_config(config: &InspectorConfig) -> Result<Self> {
        Ok(Self::with_provider(
            Arc::new(HttpProvider::new(config)?),
            config.default_timeout,
        ))
    }

    /// Create an inspector over a custom provider implementation
    pub fn with_provider(provider: Arc<dyn SandboxProvider>, default_timeout: Duration) -> Self {
        Self {
            provider,
            default_timeout,
        }
    }

    /// List all sandboxes visible to the credential, optionally filtered.
    ///
    /// Exhausts the provider's pagination; results stay in provider order.
    /// An empty fleet is an empty vector, not an error.
    pub async fn list_sandboxes(
        &self,
        state: Option<SandboxState>,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<Vec<SandboxInfo>> {
        let query = if state.is_some() || metadata.is_some() {
            Some(SandboxQuery { state, metadata })
        } else {
            None
        };

        let mut sandboxes = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.provider.list_page(query.clone(), cursor).await?;
            sandboxes.extend(page.sandboxes);
            if !page.has_more {
                break;
            }
            cursor = page.next_cursor;
        }

        debug!(count = sandboxes.len(), "listed sandboxes");
        Ok(sandboxes)
    }

    /// Get detailed information about a single sandbox
    pub async fn info(&self, sandbox_id: &str) -> Result<SandboxInfo> {
        self.provider.get_info(sandbox_id).await
    }

    /// Get resource usage metrics for a sandbox.
    ///
    /// With no time range the result collapses to a single snapshot when the
    /// provider returns exactly one point; zero or multiple points pass
    /// through as a series. With a range the result is always a series, even
    /// of length one.
    pub async fn metrics(
        &self,
        sandbox_id: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<MetricsResponse> {
        let points = self.provider.get_metrics(sandbox_id, start, end).await?;
        let mut series: Vec<SandboxMetrics> = points.into_iter().map(to_metrics).collect();

        if start.is_none() && end.is_none() && series.len() == 1 {
            return Ok(MetricsResponse::Snapshot(series.remove(0)));
        }
        Ok(MetricsResponse::Series(series))
    }

    /// Execute a shell command inside a sandbox.
    ///
    /// Streams are normalized to empty strings when absent. No retries; a
    /// failed connection or command surfaces immediately.
    pub async fn exec(
        &self,
        sandbox_id: &str,
        command: &str,
        timeout: Option<Duration>,
    ) -> Result<CommandResult> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let output = self
            .provider
            .run_command(sandbox_id, command, timeout)
            .await?;

        Ok(CommandResult {
            stdout: output.stdout.unwrap_or_default(),
            stderr: output.stderr.unwrap_or_default(),
            exit_code: output.exit_code,
        })
    }

    /// Execute code in a sandbox's managed interpreter.
    ///
    /// An execution-time failure inside the code (e.g. an unhandled
    /// exception) lands in `CodeResult::error` rather than in `Err`: the
    /// remote code under inspection is expected to fail sometimes, and the
    /// caller needs the failure content.
    pub async fn run_code(
        &self,
        sandbox_id: &str,
        code: &str,
        language: &str,
        timeout: Option<Duration>,
    ) -> Result<CodeResult> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let output = self
            .provider
            .run_code(sandbox_id, code, language, timeout)
            .await?;

        Ok(CodeResult {
            stdout: output.stdout.concat(),
            stderr: output.stderr.concat(),
            error: output.error,
            results: output.results,
        })
    }

    /// List direct children of a directory inside a sandbox.
    ///
    /// Entries whose listing line cannot be parsed are skipped; the remote
    /// listing format is not a stable contract.
    pub async fn list_files(&self, sandbox_id: &str, path: &str) -> Result<Vec<FileInfo>> {
        let command =
            format!("find {path} -maxdepth 1 -printf '%y %s %p\\n' 2>/dev/null");
        let output = self
            .provider
            .run_command(sandbox_id, &command, self.default_timeout)
            .await?;

        let stdout = output.stdout.unwrap_or_default();
        let mut files = Vec::new();
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, char::is_whitespace);
            match (parts.next(), parts.next(), parts.next()) {
                (Some(file_type), Some(size), Some(file_path)) if !file_path.is_empty() => {
                    let name = match file_path.rsplit('/').next() {
                        Some(last) if !last.is_empty() => last,
                        _ => file_path,
                    };
                    files.push(FileInfo {
                        name: name.to_string(),
                        path: file_path.to_string(),
                        is_dir: file_type == "d",
                        size_bytes: size.parse().unwrap_or(0),
                    });
                }
                _ => debug!(sandbox_id, line, "skipping unparseable listing line"),
            }
        }

        Ok(files)
    }

    /// Download a file from a sandbox as raw bytes.
    ///
    /// Text content is re-encoded as UTF-8 so the return type is uniform.
    pub async fn download(&self, sandbox_id: &str, remote_path: &str) -> Result<Vec<u8>> {
        let content = self.provider.read_file(sandbox_id, remote_path).await?;
        Ok(content.into_bytes())
    }

    /// Upload bytes to a path inside a sandbox
    pub async fn upload(&self, sandbox_id: &str, remote_path: &str, content: &[u8]) -> Result<()> {
        self.provider
            .write_file(sandbox_id, remote_path, content)
            .await
    }

    /// Terminate a sandbox.
    ///
    /// Returns `false` when the sandbox does not exist or is already
    /// terminated; any other provider failure propagates.
    pub async fn kill(&self, sandbox_id: &str) -> Result<bool> {
        match self.provider.terminate(sandbox_id).await {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Terminate every sandbox visible to the credential.
    ///
    /// Requires `confirm == true` and fails with InvalidArgument before any
    /// network call otherwise; the operation is irreversible and fleet-wide.
    /// Kills are sequential and best-effort: one member's failure does not
    /// abort the batch, and the returned count covers confirmed successes
    /// only.
    pub async fn kill_all(&self, confirm: bool) -> Result<usize> {
        if !confirm {
            return Err(InspectorError::invalid_argument(
                "must pass confirm = true to kill all sandboxes",
            ));
        }

        let sandboxes = self.list_sandboxes(None, None).await?;
        let mut count = 0;
        for sandbox in sandboxes {
            match self.kill(&sandbox.sandbox_id).await {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(sandbox_id = %sandbox.sandbox_id, error = %err, "failed to terminate sandbox");
                }
            }
        }
        Ok(count)
    }

    /// Aggregate fleet-wide statistics from a fresh listing.
    ///
    /// Only totals and extrema; oldest/newest ties go to the first
    /// occurrence in provider order.
    pub async fn summary(&self) -> Result<Summary> {
        let sandboxes = self.list_sandboxes(None, None).await?;

        let running_count = sandboxes
            .iter()
            .filter(|s| s.state == SandboxState::Running)
            .count();
        let paused_count = sandboxes
            .iter()
            .filter(|s| s.state == SandboxState::Paused)
            .count();

        let total_cpu = sandboxes.iter().map(|s| s.cpu_count as u64).sum();
        let total_memory_mb = sandboxes.iter().map(|s| s.memory_mb).sum();

        let mut oldest: Option<&SandboxInfo> = None;
        let mut newest: Option<&SandboxInfo> = None;
        for sandbox in &sandboxes {
            if oldest.map_or(true, |o| sandbox.started_at < o.started_at) {
                oldest = Some(sandbox);
            }
            if newest.map_or(true, |n| sandbox.started_at > n.started_at) {
                newest = Some(sandbox);
            }
        }

        Ok(Summary {
            running_count,
            paused_count,
            total_count: sandboxes.len(),
            total_cpu,
            total_memory_mb,
            oldest_sandbox_id: oldest.map(|s| s.sandbox_id.clone()),
            oldest_uptime: oldest.map(|s| s.uptime()),
            newest_sandbox_id: newest.map(|s| s.sandbox_id.clone()),
            newest_uptime: newest.map(|s| s.uptime()),
        })
    }
}

fn to_metrics(point: MetricPoint) -> SandboxMetrics {
    SandboxMetrics {
        cpu_count: point.cpu_count,
        cpu_pct: point.cpu_used_pct,
        mem_total_mb: point.mem_total / BYTES_PER_MB,
        mem_used_mb: point.mem_used / BYTES_PER_MB,
        disk_total_mb: point.disk_total / BYTES_PER_MB,
        disk_used_mb: point.disk_used / BYTES_PER_MB,
        timestamp: point.timestamp,
    }
}
