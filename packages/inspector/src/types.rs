// ABOUTME: Core type definitions for sandbox inspection results
// ABOUTME: Immutable snapshots of sandbox state, telemetry, execution output, and fleet summaries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::InspectorError;

/// Sandbox lifecycle state as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxState {
    /// Sandbox is running
    Running,
    /// Sandbox is paused
    Paused,
}

impl fmt::Display for SandboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxState::Running => write!(f, "running"),
            SandboxState::Paused => write!(f, "paused"),
        }
    }
}

impl FromStr for SandboxState {
    type Err = InspectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(SandboxState::Running),
            "paused" => Ok(SandboxState::Paused),
            other => Err(InspectorError::invalid_argument(format!(
                "unknown sandbox state '{other}' (expected 'running' or 'paused')"
            ))),
        }
    }
}

/// Information about a sandbox instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SandboxInfo {
    /// Opaque sandbox identifier
    pub sandbox_id: String,
    /// Template the sandbox was created from
    pub template_id: String,
    /// Optional display name
    pub name: Option<String>,
    /// User-supplied metadata key-value pairs
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Current lifecycle state
    pub state: SandboxState,
    /// When the sandbox was started
    pub started_at: DateTime<Utc>,
    /// When the sandbox will time out
    pub end_at: DateTime<Utc>,
    /// Number of CPU cores
    pub cpu_count: u32,
    /// Memory allocation in megabytes
    pub memory_mb: u64,
}

impl SandboxInfo {
    /// Time since the sandbox was started
    pub fn uptime(&self) -> Duration {
        Utc::now() - self.started_at
    }

    /// Time until the sandbox times out, never negative
    pub fn time_remaining(&self) -> Duration {
        (self.end_at - Utc::now()).max(Duration::zero())
    }
}

/// Resource usage metrics for a sandbox at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SandboxMetrics {
    /// Number of CPU cores
    pub cpu_count: u32,
    /// CPU usage percentage; may transiently exceed 100 under oversubscription
    pub cpu_pct: f64,
    /// Total memory in megabytes
    pub mem_total_mb: u64,
    /// Used memory in megabytes
    pub mem_used_mb: u64,
    /// Total disk in megabytes
    pub disk_total_mb: u64,
    /// Used disk in megabytes
    pub disk_used_mb: u64,
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,
}

impl SandboxMetrics {
    /// Memory usage as a percentage, rounded to one decimal
    pub fn mem_pct(&self) -> f64 {
        usage_pct(self.mem_used_mb, self.mem_total_mb)
    }

    /// Disk usage as a percentage, rounded to one decimal
    pub fn disk_pct(&self) -> f64 {
        usage_pct(self.disk_used_mb, self.disk_total_mb)
    }
}

// Zero total yields 0.0 rather than an error; used > total is not clamped.
fn usage_pct(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Telemetry response: a single current snapshot or a historical series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricsResponse {
    /// Single point-in-time reading
    Snapshot(SandboxMetrics),
    /// Ordered sequence of readings over a window
    Series(Vec<SandboxMetrics>),
}

impl MetricsResponse {
    /// Most recent reading, if any
    pub fn latest(&self) -> Option<&SandboxMetrics> {
        match self {
            MetricsResponse::Snapshot(m) => Some(m),
            MetricsResponse::Series(series) => series.last(),
        }
    }

    /// Flatten into a vector of readings
    pub fn into_vec(self) -> Vec<SandboxMetrics> {
        match self {
            MetricsResponse::Snapshot(m) => vec![m],
            MetricsResponse::Series(series) => series,
        }
    }
}

/// Result of executing a shell command inside a sandbox
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    /// Captured standard output, empty if the command produced none
    pub stdout: String,
    /// Captured standard error, empty if the command produced none
    pub stderr: String,
    /// Process exit code
    pub exit_code: i32,
}

impl CommandResult {
    /// True if the command exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Result of executing code in a managed interpreter context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeResult {
    /// Concatenated stdout log lines, in emission order
    pub stdout: String,
    /// Concatenated stderr log lines, in emission order
    pub stderr: String,
    /// Execution-time error reported by the interpreter, if any.
    /// Carried as data: failing remote code is an expected outcome,
    /// not an inspector failure.
    pub error: Option<String>,
    /// Textual representations of returned value objects, in order
    pub results: Vec<String>,
}

impl CodeResult {
    /// True if the code executed without an execution-time error
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Information about a file or directory inside a sandbox
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    /// Leaf name of the entry
    pub name: String,
    /// Path as reported by the sandbox, not normalized
    pub path: String,
    /// True for directories
    pub is_dir: bool,
    /// Size in bytes; 0 for directories or when unknown
    pub size_bytes: u64,
}

/// Aggregate statistics over the visible fleet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of running sandboxes
    pub running_count: usize,
    /// Number of paused sandboxes
    pub paused_count: usize,
    /// Total number of sandboxes
    pub total_count: usize,
    /// Sum of CPU cores across the fleet
    pub total_cpu: u64,
    /// Sum of memory allocations in megabytes
    pub total_memory_mb: u64,
    /// Sandbox with the earliest start time, None when the fleet is empty
    pub oldest_sandbox_id: Option<String>,
    /// Uptime of the oldest sandbox
    #[serde(with = "duration_secs")]
    pub oldest_uptime: Option<Duration>,
    /// Sandbox with the latest start time, None when the fleet is empty
    pub newest_sandbox_id: Option<String>,
    /// Uptime of the newest sandbox
    #[serde(with = "duration_secs")]
    pub newest_uptime: Option<Duration>,
}

mod duration_secs {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.num_seconds()),
            None => serializer.serialize_none(),
        }
    }
}
