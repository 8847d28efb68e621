//! `chromerecipe external`
//!
//! Terraform's `external` data source sends a JSON object of strings on stdin
//! and expects a JSON object of strings on stdout. Lists and maps travel as
//! JSON-encoded strings.

use super::{provider, read_recipe};
use crate::settings::AppConfig;
use anyhow::{Context, Result};
use chromerecipe_provider::RecipeState;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tokio::io::AsyncReadExt;

/// Query accepted on stdin
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalQuery {
    /// JSON-encoded list of action definitions
    pub actions: String,
    #[serde(default)]
    pub screenshot_filename: Option<String>,
    #[serde(default)]
    pub screenshot_selector: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl ExternalQuery {
    pub fn parse(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Query must be a JSON object of strings")
    }

    /// Provider configuration
    pub fn provider_config(&self) -> Value {
        match self.endpoint.as_deref().filter(|e| !e.is_empty()) {
            Some(endpoint) => json!({ "endpoint": endpoint }),
            None => json!({}),
        }
    }

    /// Data source configuration with `actions` decoded
    pub fn recipe_config(&self) -> Result<Value> {
        let actions: Vec<Vec<String>> = serde_json::from_str(&self.actions)
            .context("\"actions\" must be a JSON-encoded list of lists of strings")?;

        let mut config = Map::new();
        config.insert("actions".to_string(), json!(actions));
        if let Some(filename) = self.screenshot_filename.as_deref().filter(|f| !f.is_empty()) {
            config.insert("screenshot_filename".to_string(), json!(filename));
        }
        if let Some(selector) = self.screenshot_selector.as_deref().filter(|s| !s.is_empty()) {
            config.insert("screenshot_selector".to_string(), json!(selector));
        }
        Ok(Value::Object(config))
    }
}

/// Flatten state into the string map Terraform expects.
pub fn render_result(state: &RecipeState) -> Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();
    result.insert("id".to_string(), state.id.clone());
    result.insert("values".to_string(), serde_json::to_string(&state.values)?);
    result.insert(
        "screenshot_filename".to_string(),
        state.screenshot_filename.clone().unwrap_or_default(),
    );
    Ok(result)
}

pub async fn run(settings: &AppConfig) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read query from stdin")?;

    let query = ExternalQuery::parse(&input)?;
    let state = read_recipe(
        &provider(settings),
        &query.provider_config(),
        &query.recipe_config()?,
    )
    .await?;

    println!("{}", serde_json::to_string(&render_result(&state)?)?);
    Ok(())
}
