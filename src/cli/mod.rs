//! CLI module for chromerecipe
//!
//! Provides commands:
//! - `schema`: print provider and data source schemas
//! - `read`: run a recipe file and print the resulting state
//! - `external`: Terraform `external` data source protocol
//! - `doctor`: check that a browser is reachable

use crate::settings::{load_config, AppConfig};
use anyhow::{bail, Context, Result};
use chromerecipe_provider::{
    ChromedpProvider, DataSource, Diagnostics, Provider, ProviderData, RecipeState,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

pub mod doctor;
pub mod external;
pub mod read;
pub mod schema;

/// chromerecipe CLI
#[derive(Parser, Debug)]
#[command(name = "chromerecipe")]
#[command(about = "Run browser automation recipes through Chrome DevTools")]
#[command(version)]
pub struct Cli {
    /// Extra configuration file, applied after config/local.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print provider and data source schemas as JSON
    Schema,
    /// Run a recipe file (TOML or JSON) and print its state
    Read {
        /// Recipe file
        path: PathBuf,
    },
    /// Answer a Terraform `external` data source query on stdin
    External,
    /// Check that the browser is reachable
    Doctor,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Schema) => schema::run(),
        Some(Commands::Read { path }) => {
            let settings = load_config(cli.config.as_deref())?;
            read::run(&settings, &path).await
        }
        Some(Commands::External) => {
            let settings = load_config(cli.config.as_deref())?;
            external::run(&settings).await
        }
        Some(Commands::Doctor) => doctor::run(cli.config.as_deref()).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Provider built from application settings
pub fn provider(settings: &AppConfig) -> ChromedpProvider {
    ChromedpProvider::new(env!("CARGO_PKG_VERSION"))
        .with_driver_config(settings.browser.driver_config())
        .with_action_timeout(settings.browser.action_timeout())
}

/// Print diagnostics to stderr and fail if any is an error.
pub fn report(diagnostics: &Diagnostics) -> Result<()> {
    for diagnostic in diagnostics.iter() {
        eprintln!("{diagnostic}");
    }
    if diagnostics.has_error() {
        bail!("{} error(s) reported", diagnostics.errors().count());
    }
    Ok(())
}

/// Configure the provider with `provider_config`.
pub async fn configure(provider: &ChromedpProvider, provider_config: &Value) -> Result<ProviderData> {
    let response = provider.configure(provider_config).await;
    report(&response.diagnostics).context("Failed to configure provider")?;
    response
        .data
        .context("Provider returned no data after configuration")
}

/// Configure the provider, then read the recipe data source once.
pub async fn read_recipe(
    provider: &ChromedpProvider,
    provider_config: &Value,
    recipe_config: &Value,
) -> Result<RecipeState> {
    let data = configure(provider, provider_config).await?;

    let mut source: Box<dyn DataSource> = recipe_data_source(provider)?;
    report(&source.configure(Some(&data)))?;

    let response = source.read(recipe_config).await;
    report(&response.diagnostics).context("Failed to read recipe")?;
    let state = response.state.context("Recipe produced no state")?;
    serde_json::from_value(state).context("Failed to decode recipe state")
}

fn recipe_data_source(provider: &ChromedpProvider) -> Result<Box<dyn DataSource>> {
    let type_name = provider.metadata().type_name;
    provider
        .data_sources()
        .into_iter()
        .map(|build| build())
        .find(|source| source.metadata(&type_name) == format!("{type_name}_recipe"))
        .context("Provider has no recipe data source")
}
