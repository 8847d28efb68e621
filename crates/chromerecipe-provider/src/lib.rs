//! chromerecipe Provider - Provider and Data Source Lifecycle
//!
//! This crate wires the recipe engine into a provider shape:
//! - Provider: endpoint resolution, connectivity check, shared runner
//! - Data source: the `recipe` data source (Metadata, Schema, Configure, Read)
//! - Schema: attribute declarations and configuration validation
//! - Diagnostics: error and warning reporting for lifecycle calls

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod data_source;
pub mod diag;
pub mod framework;
pub mod provider;
pub mod schema;

pub use data_source::{RecipeDataSource, RecipeState};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use framework::{
    ConfigureResponse, DataSource, DataSourceFactory, Provider, ProviderMetadata, ReadResponse,
};
pub use provider::{ChromedpProvider, FactoryBuilder, ProviderData, PROVIDER_TYPE_NAME};
pub use schema::{AttrType, Attribute, Mode, Schema, Validator};
