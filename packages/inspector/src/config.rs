// ABOUTME: Inspector configuration resolved at construction time
// ABOUTME: API key, base URL, and default timeout from arguments or environment

use std::env;
use std::time::Duration;

use crate::error::{InspectorError, Result};

/// Environment variable holding the API key
pub const SBXRAY_API_KEY: &str = "SBXRAY_API_KEY";
/// Environment variable overriding the API base URL
pub const SBXRAY_API_URL: &str = "SBXRAY_API_URL";
/// Environment variable overriding the default operation timeout in seconds
pub const SBXRAY_DEFAULT_TIMEOUT_SECS: &str = "SBXRAY_DEFAULT_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "https://api.sbxray.dev";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Read-only configuration for the inspector.
///
/// Resolved once at construction, before any network access.
#[derive(Debug, Clone)]
pub struct InspectorConfig {
    /// API credential sent with every request
    pub api_key: String,
    /// Base URL of the sandbox-hosting service
    pub api_url: String,
    /// Default timeout for exec and code operations
    pub default_timeout: Duration,
}

impl InspectorConfig {
    /// Resolve configuration from an explicit API key or the environment.
    ///
    /// An explicit key wins over the environment; absence of both is a
    /// configuration error.
    pub fn resolve(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .or_else(|| env::var(SBXRAY_API_KEY).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                InspectorError::config(format!(
                    "API key required: pass one explicitly or set {SBXRAY_API_KEY}"
                ))
            })?;

        let api_url = env::var(SBXRAY_API_URL)
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let default_timeout = env::var(SBXRAY_DEFAULT_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            api_key,
            api_url,
            default_timeout,
        })
    }

    /// Build a configuration from an explicit key, defaults for the rest
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
