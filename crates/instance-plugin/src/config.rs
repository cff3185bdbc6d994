//! Plugin configuration
//!
//! The values here are normally filled in by the command line front-end.
//! Only the API access key has an environment fallback.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the API access key
pub const API_KEY_ENV: &str = "ONEANDONE_API_KEY";

/// Remote state a created server is waited for
pub const READY_STATE: &str = "POWERED_ON";

/// Configuration for a [`crate::Provisioner`]
#[derive(Debug, Clone)]
pub struct PluginConfig {
    /// API access key; `None` leaves the plugin unconfigured
    pub api_key: Option<String>,

    /// Directory holding the instance descriptor files
    pub state_dir: PathBuf,

    /// Poll-until-ready behavior after a server is created
    pub wait: WaitConfig,
}

impl PluginConfig {
    pub fn new(api_key: Option<String>, state_dir: impl AsRef<Path>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            state_dir: state_dir.as_ref().to_path_buf(),
            wait: WaitConfig::default(),
        }
    }

    pub fn with_wait(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Whether an API credential is available at all
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self::new(resolve_api_key(None), default_state_dir())
    }
}

/// Bounded poll budget for the wait-for-ready step
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Whether to wait at all
    pub enabled: bool,

    /// Delay between two polls
    pub interval: Duration,

    /// Maximum number of polls
    pub max_attempts: u32,
}

impl WaitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(10),
            max_attempts: 360,
        }
    }
}

/// Pick the API key from an explicit value, falling back to [`API_KEY_ENV`].
///
/// Blank values on either side count as absent.
pub fn resolve_api_key(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(API_KEY_ENV)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
}

/// Default descriptor directory: the process temp directory
pub fn default_state_dir() -> PathBuf {
    std::env::temp_dir()
}
