//! Provider lifecycle traits
//!
//! A provider is configured once and then hands its [`ProviderData`] to each
//! data source it exposes. Data sources are read with a JSON configuration
//! object and answer with a JSON state object plus diagnostics.

use crate::diag::Diagnostics;
use crate::schema::Schema;
use crate::ProviderData;
use async_trait::async_trait;
use serde_json::Value;

/// Provider name and version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Prefix for data source type names
    pub type_name: String,
    /// Provider version
    pub version: String,
}

/// Result of configuring a provider
#[derive(Debug, Default)]
pub struct ConfigureResponse {
    /// Shared data for data sources, present on success
    pub data: Option<ProviderData>,
    /// Problems found while configuring
    pub diagnostics: Diagnostics,
}

/// Result of reading a data source
#[derive(Debug, Default)]
pub struct ReadResponse {
    /// New state, present on success
    pub state: Option<Value>,
    /// Problems found while reading
    pub diagnostics: Diagnostics,
}

/// Constructor for a data source
pub type DataSourceFactory = fn() -> Box<dyn DataSource>;

/// A configurable provider
#[async_trait]
pub trait Provider: Send + Sync {
    /// Name and version
    fn metadata(&self) -> ProviderMetadata;

    /// Provider configuration schema
    fn schema(&self) -> Schema;

    /// Validate configuration and prepare shared data
    async fn configure(&self, config: &Value) -> ConfigureResponse;

    /// Data sources exposed by this provider
    fn data_sources(&self) -> Vec<DataSourceFactory>;
}

/// A read-only data source
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Full type name, given the provider's type name
    fn metadata(&self, provider_type_name: &str) -> String;

    /// Configuration and state schema
    fn schema(&self) -> Schema;

    /// Receive provider data; `None` means the provider is not configured yet
    fn configure(&mut self, provider_data: Option<&ProviderData>) -> Diagnostics;

    /// Compute state from configuration
    async fn read(&self, config: &Value) -> ReadResponse;
}
