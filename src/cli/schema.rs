//! `chromerecipe schema`

use anyhow::Result;
use chromerecipe_provider::{ChromedpProvider, Provider};
use serde_json::{json, Map, Value};

/// Provider and data source schemas as one JSON document
pub fn document(provider: &ChromedpProvider) -> Result<Value> {
    let metadata = provider.metadata();

    let mut data_sources = Map::new();
    for build in provider.data_sources() {
        let source = build();
        data_sources.insert(
            source.metadata(&metadata.type_name),
            serde_json::to_value(source.schema())?,
        );
    }

    Ok(json!({
        "provider": {
            "type_name": metadata.type_name,
            "version": metadata.version,
            "schema": serde_json::to_value(provider.schema())?,
        },
        "data_sources": data_sources,
    }))
}

pub fn run() -> Result<()> {
    let provider = ChromedpProvider::new(env!("CARGO_PKG_VERSION"));
    println!("{}", serde_json::to_string_pretty(&document(&provider)?)?);
    Ok(())
}
