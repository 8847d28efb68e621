//! Driver configuration
//!
//! Configuration types for the Chrome session factory.

use serde::{Deserialize, Serialize};

/// Default time to wait for an element to become visible (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Chrome connection and launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    /// DevTools websocket URL such as `ws://localhost:9222/devtools/browser/<id>`.
    /// A local Chrome is launched when unset.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Run a launched Chrome without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pass `--no-sandbox` to a launched Chrome (needed inside most containers)
    #[serde(default)]
    pub no_sandbox: bool,

    /// Chrome binary to launch instead of the one found on `$PATH`
    #[serde(default)]
    pub executable_path: Option<String>,

    /// Viewport width
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    /// Viewport height
    #[serde(default = "default_window_height")]
    pub window_height: u32,

    /// How long `wait_visible` polls before giving up, in milliseconds
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Delay between visibility polls, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            headless: true,
            no_sandbox: false,
            executable_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            wait_timeout_ms: default_wait_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl DriverConfig {
    /// Use a remote Chrome
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The endpoint, ignoring empty strings
    #[must_use]
    pub fn remote_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.trim().is_empty())
    }
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

fn default_poll_interval() -> u64 {
    100
}
