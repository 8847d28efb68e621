use crate::settings::{load_config, AppConfig};
use chromerecipe_driver::ENDPOINT_ENV;
use chromerecipe_provider::Provider;
use serde_json::json;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("🏥 chromerecipe doctor\n");

    let Some(settings) = check_config(config_path) else {
        anyhow::bail!("configuration could not be loaded");
    };
    check_endpoint(&settings);
    let all_ok = check_browser(&settings).await;

    println!();
    if all_ok {
        println!("✅ All checks passed! Recipes can run.");
        Ok(())
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        anyhow::bail!("doctor checks failed")
    }
}

fn check_config(config_path: Option<&Path>) -> Option<AppConfig> {
    print!("Checking configuration... ");

    match load_config(config_path) {
        Ok(settings) => {
            println!("✅ Loaded");
            if Path::new("config/local.toml").exists() {
                println!("  ℹ️  Using config/local.toml overrides");
            }
            if let Some(path) = config_path {
                println!("  ℹ️  Using {}", path.display());
            }
            Some(settings)
        }
        Err(e) => {
            println!("❌ {e:#}");
            None
        }
    }
}

fn check_endpoint(settings: &AppConfig) {
    print!("Checking browser source... ");

    let from_env = std::env::var(ENDPOINT_ENV).ok().filter(|e| !e.is_empty());
    let driver = settings.browser.driver_config();
    match (from_env, driver.remote_endpoint()) {
        (Some(endpoint), _) => println!("✅ {endpoint} (from {ENDPOINT_ENV})"),
        (None, Some(endpoint)) => println!("✅ {endpoint} (from configuration)"),
        (None, None) => match &driver.executable_path {
            Some(path) => println!("ℹ️  Local Chrome at {path} will be launched"),
            None => println!("ℹ️  Local Chrome from $PATH will be launched"),
        },
    }
}

async fn check_browser(settings: &AppConfig) -> bool {
    print!("Checking browser connectivity... ");

    let response = super::provider(settings).configure(&json!({})).await;
    if response.data.is_some() && !response.diagnostics.has_error() {
        println!("✅ Reachable");
        true
    } else {
        println!("❌ Unreachable");
        for diagnostic in response.diagnostics.errors() {
            println!("  {}", diagnostic.detail);
        }
        false
    }
}
