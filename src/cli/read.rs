//! `chromerecipe read <file>`
//!
//! Recipe files carry the data source configuration, plus an optional
//! `endpoint` that is passed to the provider.

use super::{provider, read_recipe};
use crate::settings::AppConfig;
use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

/// Parse a recipe file by extension (`.json`, otherwise TOML).
pub fn parse_recipe_file(path: &Path, content: &str) -> Result<Value> {
    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        _ => {
            let table: toml::Table = toml::from_str(content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?;
            serde_json::to_value(table)?
        }
    };
    if !value.is_object() {
        bail!("{} must contain a table of recipe attributes", path.display());
    }
    Ok(value)
}

/// Split a recipe file into provider and data source configuration.
pub fn split_endpoint(mut recipe: Value) -> (Value, Value) {
    let endpoint = recipe
        .as_object_mut()
        .and_then(|object| object.remove("endpoint"));
    let provider = match endpoint {
        Some(endpoint) => json!({ "endpoint": endpoint }),
        None => json!({}),
    };
    (provider, recipe)
}

pub async fn run(settings: &AppConfig, path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (provider_config, recipe_config) = split_endpoint(parse_recipe_file(path, &content)?);

    let state = read_recipe(&provider(settings), &provider_config, &recipe_config).await?;
    info!(id = %state.id, values = state.values.len(), "Recipe finished");
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
