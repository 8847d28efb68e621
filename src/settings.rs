//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use anyhow::{Context, Result};
use chromerecipe_core::recipe::DEFAULT_ACTION_TIMEOUT_MS;
use chromerecipe_driver::DriverConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Browser settings
    #[serde(default)]
    pub browser: BrowserSettings,
}

/// `[browser]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    pub headless: bool,
    pub no_sandbox: bool,
    #[serde(default)]
    pub executable_path: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub wait_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub action_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        let driver = DriverConfig::default();
        Self {
            endpoint: driver.endpoint,
            headless: driver.headless,
            no_sandbox: driver.no_sandbox,
            executable_path: driver.executable_path,
            window_width: driver.window_width,
            window_height: driver.window_height,
            wait_timeout_ms: driver.wait_timeout_ms,
            poll_interval_ms: driver.poll_interval_ms,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
        }
    }
}

impl BrowserSettings {
    /// Settings handed to the Chrome session factory
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            endpoint: self.endpoint.clone().filter(|e| !e.is_empty()),
            headless: self.headless,
            no_sandbox: self.no_sandbox,
            executable_path: self.executable_path.clone().filter(|p| !p.is_empty()),
            window_width: self.window_width,
            window_height: self.window_height,
            wait_timeout_ms: self.wait_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }
}

/// Load configuration from files and environment
pub fn load_config(extra: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. Local overrides (optional)
        .add_source(File::with_name("config/local").required(false));

    // 3. Explicit file from --config
    if let Some(path) = extra {
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        // 4. Environment variables (highest priority)
        // CHROMERECIPE_BROWSER__HEADLESS=false sets browser.headless.
        .add_source(
            Environment::with_prefix("CHROMERECIPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
