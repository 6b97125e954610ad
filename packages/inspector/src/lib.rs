// ABOUTME: Control and telemetry facade for remote sbxray sandboxes
// ABOUTME: Listing, metrics, execution, file transfer, and lifecycle over one provider seam

mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod inspector;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use config::InspectorConfig;
pub use error::{InspectorError, Result};
pub use http::HttpProvider;
pub use inspector::SandboxInspector;
pub use provider::{
    CommandOutput, ExecutionOutput, FileContent, MetricPoint, SandboxPage, SandboxProvider,
    SandboxQuery,
};
pub use types::{
    CodeResult, CommandResult, FileInfo, MetricsResponse, SandboxInfo, SandboxMetrics,
    SandboxState, Summary,
};
