//! The `chromedp` provider
//!
//! Resolves where Chrome comes from, checks that it answers, and shares a
//! [`RecipeRunner`] with the recipe data source.

use crate::data_source::RecipeDataSource;
use crate::diag::Diagnostics;
use crate::framework::{ConfigureResponse, DataSourceFactory, Provider, ProviderMetadata};
use crate::schema::{AttrType, Attribute, Schema};
use async_trait::async_trait;
use chromerecipe_core::recipe::DEFAULT_ACTION_TIMEOUT_MS;
use chromerecipe_core::{RecipeRunner, SessionFactory};
use chromerecipe_driver::{ChromeFactory, DriverConfig, ENDPOINT_ENV};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Provider type name
pub const PROVIDER_TYPE_NAME: &str = "chromedp";

/// Builds a session factory from resolved driver settings
pub type FactoryBuilder = Arc<dyn Fn(DriverConfig) -> Arc<dyn SessionFactory> + Send + Sync>;

/// Data shared by a configured provider with its data sources
#[derive(Debug, Clone)]
pub struct ProviderData {
    runner: RecipeRunner,
}

impl ProviderData {
    /// Wrap a runner
    #[must_use]
    pub fn new(runner: RecipeRunner) -> Self {
        Self { runner }
    }

    /// The runner recipes are executed with
    #[must_use]
    pub fn runner(&self) -> &RecipeRunner {
        &self.runner
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProviderModel {
    #[serde(default)]
    endpoint: Option<String>,
}

/// Pick the endpoint: the configured value, then the environment, then the
/// settings fallback. Empty strings count as unset at every level.
#[must_use]
pub fn resolve_endpoint(
    configured: Option<&str>,
    env: Option<&str>,
    fallback: Option<&str>,
) -> Option<String> {
    [configured, env, fallback]
        .into_iter()
        .flatten()
        .find(|e| !e.is_empty())
        .map(str::to_string)
}

/// Open a session and load `about:blank` to prove the browser answers.
pub async fn ping(factory: &dyn SessionFactory) -> chromerecipe_core::Result<()> {
    let session = factory.open().await?;
    let navigated = session.navigate("about:blank").await;
    let closed = session.close().await;
    navigated?;
    closed
}

/// Provider exposing the `recipe` data source
pub struct ChromedpProvider {
    version: String,
    driver: DriverConfig,
    action_timeout: Duration,
    build_factory: FactoryBuilder,
}

impl std::fmt::Debug for ChromedpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromedpProvider")
            .field("version", &self.version)
            .field("driver", &self.driver)
            .field("action_timeout", &self.action_timeout)
            .finish()
    }
}

impl ChromedpProvider {
    /// Provider backed by chromiumoxide. `version` is reported in metadata.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            driver: DriverConfig::default(),
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
            build_factory: Arc::new(|config: DriverConfig| -> Arc<dyn SessionFactory> {
                Arc::new(ChromeFactory::new(config))
            }),
        }
    }

    /// Base driver settings; the endpoint may still be overridden by
    /// provider configuration or the environment
    #[must_use]
    pub fn with_driver_config(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    /// Per-call timeout for recipe actions
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Replace how session factories are built
    #[must_use]
    pub fn with_factory_builder(mut self, build_factory: FactoryBuilder) -> Self {
        self.build_factory = build_factory;
        self
    }
}

#[async_trait]
impl Provider for ChromedpProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: self.version.clone(),
        }
    }

    fn schema(&self) -> Schema {
        Schema::new("Drives Chrome through the DevTools Protocol.").attribute(
            "endpoint",
            Attribute::optional(
                AttrType::String,
                format!(
                    "URL of the Chrome DevTools websocket, like \"ws://hostname\" or \"ws://hostname:port\".\n\
                     Can be set through the {ENDPOINT_ENV} environment variable.\n\
                     Without an endpoint, a local Chrome found on $PATH is launched."
                ),
            ),
        )
    }

    async fn configure(&self, config: &Value) -> ConfigureResponse {
        let mut diagnostics = Diagnostics::new();
        let config = if config.is_null() {
            Value::Object(Default::default())
        } else {
            config.clone()
        };

        diagnostics.append(self.schema().validate(&config));
        if diagnostics.has_error() {
            return ConfigureResponse {
                data: None,
                diagnostics,
            };
        }

        let model: ProviderModel = match serde_json::from_value(config) {
            Ok(model) => model,
            Err(e) => {
                diagnostics.add_error("Invalid provider configuration", e.to_string());
                return ConfigureResponse {
                    data: None,
                    diagnostics,
                };
            }
        };

        let from_env = std::env::var(ENDPOINT_ENV).ok();
        if let (Some(configured), Some(env)) = (
            model.endpoint.as_deref().filter(|e| !e.is_empty()),
            from_env.as_deref().filter(|e| !e.is_empty()),
        ) {
            if configured != env {
                diagnostics.add_warning(
                    "Endpoint overrides environment",
                    format!("using \"{configured}\" instead of {ENDPOINT_ENV}=\"{env}\""),
                );
            }
        }
        let endpoint = resolve_endpoint(
            model.endpoint.as_deref(),
            from_env.as_deref(),
            self.driver.endpoint.as_deref(),
        );
        let driver = DriverConfig {
            endpoint,
            ..self.driver.clone()
        };
        debug!(endpoint = ?driver.endpoint, "Configuring provider");

        let factory = (self.build_factory)(driver);
        if let Err(e) = ping(factory.as_ref()).await {
            diagnostics.add_error("Cannot start to chromedp", e.to_string());
            return ConfigureResponse {
                data: None,
                diagnostics,
            };
        }
        info!(source = %factory.describe(), "Browser is reachable");

        let runner = RecipeRunner::new(factory).with_action_timeout(self.action_timeout);
        ConfigureResponse {
            data: Some(ProviderData::new(runner)),
            diagnostics,
        }
    }

    fn data_sources(&self) -> Vec<DataSourceFactory> {
        vec![RecipeDataSource::boxed as DataSourceFactory]
    }
}
