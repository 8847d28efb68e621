//! Session factory
//!
//! Every session gets its own page. With a remote endpoint the factory
//! connects to the running Chrome; otherwise it launches one from `$PATH`
//! (or `executable_path`) and shuts it down again when the session closes.

use crate::config::DriverConfig;
use crate::error::{Error, Result};
use crate::session::{ChromeSession, Ownership};
use async_trait::async_trait;
use chromerecipe_core::{BrowserDriver, SessionFactory};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info};

/// Opens Chrome sessions according to a [`DriverConfig`]
#[derive(Debug, Clone)]
pub struct ChromeFactory {
    config: DriverConfig,
}

impl ChromeFactory {
    /// Create a factory
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    fn launch_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.config.window_width, self.config.window_height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !self.config.headless {
            builder = builder.with_head();
        }
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.config.executable_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(Error::Config)
    }

    async fn start(&self) -> Result<(Browser, Handler, Ownership)> {
        match self.config.remote_endpoint() {
            Some(endpoint) => {
                debug!(endpoint, "Connecting to remote chrome");
                let (browser, handler) =
                    Browser::connect(endpoint)
                        .await
                        .map_err(|source| Error::Connect {
                            target: endpoint.to_string(),
                            source,
                        })?;
                Ok((browser, handler, Ownership::Connected))
            }
            None => {
                let config = self.launch_config()?;
                info!(
                    headless = self.config.headless,
                    executable = ?self.config.executable_path,
                    "Launching chrome"
                );
                let (browser, handler) =
                    Browser::launch(config)
                        .await
                        .map_err(|source| Error::Connect {
                            target: "local chrome".to_string(),
                            source,
                        })?;
                Ok((browser, handler, Ownership::Launched))
            }
        }
    }

    /// Open a session with the concrete session type
    pub async fn open_session(&self) -> Result<ChromeSession> {
        let (mut browser, mut handler, ownership) = self.start().await?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                if ownership == Ownership::Launched {
                    let _ = browser.close().await;
                }
                return Err(e.into());
            }
        };

        Ok(ChromeSession::new(
            browser,
            page,
            ownership,
            handler_task,
            Duration::from_millis(self.config.wait_timeout_ms),
            Duration::from_millis(self.config.poll_interval_ms),
        ))
    }
}

#[async_trait]
impl SessionFactory for ChromeFactory {
    async fn open(&self) -> chromerecipe_core::Result<Box<dyn BrowserDriver>> {
        let session = self.open_session().await?;
        Ok(Box::new(session))
    }

    fn describe(&self) -> String {
        match self.config.remote_endpoint() {
            Some(endpoint) => format!("remote chrome at {endpoint}"),
            None => match &self.config.executable_path {
                Some(path) => format!("local chrome ({path})"),
                None => "local chrome".to_string(),
            },
        }
    }
}
