//! Provider and data source lifecycle against an in-memory browser

use async_trait::async_trait;
use chromerecipe_core::{BrowserDriver, CookieSpec, Error, Result, SessionFactory};
use chromerecipe_driver::DriverConfig;
use chromerecipe_provider::{
    ChromedpProvider, DataSource, Provider, ProviderData, RecipeState, PROVIDER_TYPE_NAME,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakePage {
    elements: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, selector: &str) -> Result<String> {
        self.elements
            .get(selector)
            .cloned()
            .ok_or_else(|| Error::Browser(format!("no element matches {selector}")))
    }
}

#[async_trait]
impl BrowserDriver for FakePage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {url}"));
        Ok(())
    }

    async fn wait_visible(&self, selector: &str) -> Result<()> {
        self.record(format!("wait_visible {selector}"));
        self.lookup(selector).map(|_| ())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.record(format!("click {selector}"));
        self.lookup(selector).map(|_| ())
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        self.record(format!("focus {selector}"));
        Ok(())
    }

    async fn value(&self, selector: &str) -> Result<String> {
        self.lookup(selector)
    }

    async fn text_content(&self, selector: &str) -> Result<String> {
        self.lookup(selector)
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<()> {
        self.record(format!("set_value {selector} {value}"));
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<()> {
        self.record(format!("press_enter {selector}"));
        Ok(())
    }

    async fn set_cookie(&self, cookie: &CookieSpec) -> Result<()> {
        self.record(format!("cookie {}={}", cookie.name, cookie.value));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"viewport".to_vec())
    }

    async fn element_screenshot(&self, selector: &str) -> Result<Vec<u8>> {
        self.lookup(selector).map(String::into_bytes)
    }

    async fn close(&self) -> Result<()> {
        self.record("close".to_string());
        Ok(())
    }
}

struct FakeFactory {
    elements: HashMap<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
    reachable: bool,
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self) -> Result<Box<dyn BrowserDriver>> {
        if !self.reachable {
            return Err(Error::Connection("connection refused".to_string()));
        }
        Ok(Box::new(FakePage {
            elements: self.elements.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }

    fn describe(&self) -> String {
        "fake browser".to_string()
    }
}

fn provider(reachable: bool, calls: Arc<Mutex<Vec<String>>>) -> ChromedpProvider {
    let elements: HashMap<String, String> = [
        ("#name", "Ada"),
        ("h1", "Welcome"),
        ("#card", "card-png"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    ChromedpProvider::new("test").with_factory_builder(Arc::new(move |_config: DriverConfig| {
        Arc::new(FakeFactory {
            elements: elements.clone(),
            calls: Arc::clone(&calls),
            reachable,
        }) as Arc<dyn SessionFactory>
    }))
}

async fn configured_source(calls: Arc<Mutex<Vec<String>>>) -> Box<dyn DataSource> {
    let provider = provider(true, calls);
    let response = provider.configure(&json!({ "endpoint": "ws://fake:9222" })).await;
    assert!(!response.diagnostics.has_error(), "{:?}", response.diagnostics);
    let data: ProviderData = response.data.expect("provider data");

    let mut source = provider.data_sources()[0]();
    assert!(source.configure(Some(&data)).is_empty());
    source
}

#[tokio::test]
async fn test_configure_pings_browser() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let response = provider(true, Arc::clone(&calls)).configure(&Value::Null).await;

    assert!(response.data.is_some());
    assert_eq!(
        *calls.lock().unwrap(),
        vec!["navigate about:blank".to_string(), "close".to_string()]
    );
}

#[tokio::test]
async fn test_configure_reports_unreachable_browser() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let response = provider(false, calls).configure(&json!({})).await;

    assert!(response.data.is_none());
    let diag = response.diagnostics.errors().next().unwrap();
    assert_eq!(diag.summary, "Cannot start to chromedp");
    assert!(diag.detail.contains("connection refused"));
}

#[tokio::test]
async fn test_configure_rejects_unknown_attribute() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let response = provider(true, Arc::clone(&calls))
        .configure(&json!({ "endpont": "ws://typo" }))
        .await;

    assert!(response.data.is_none());
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_read_collects_values() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let source = configured_source(Arc::clone(&calls)).await;
    calls.lock().unwrap().clear();

    let actions = json!([
        ["navigate", "https://example.com/form"],
        ["set_value", "#name", "Ada"],
        ["press_enter", "#name"],
        ["value", "#name", "name"],
        ["text", "h1", "title"],
        ["value", "#name", "unused"]
    ]);
    let response = source.read(&json!({ "actions": actions })).await;
    assert!(!response.diagnostics.has_error(), "{:?}", response.diagnostics);

    let state: RecipeState = serde_json::from_value(response.state.unwrap()).unwrap();
    assert_eq!(state.id.len(), 64);
    assert_eq!(state.values["name"], "Ada");
    assert_eq!(state.values["title"], "Welcome");
    assert_eq!(state.actions.len(), 6);
    assert_eq!(state.screenshot_filename, None);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "navigate https://example.com/form".to_string(),
            "set_value #name Ada".to_string(),
            "press_enter #name".to_string(),
            "close".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_read_same_actions_same_id() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let source = configured_source(calls).await;
    let config = json!({ "actions": [["navigate", "about:blank"]] });

    let first = source.read(&config).await.state.unwrap();
    let second = source.read(&config).await.state.unwrap();
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_read_reports_every_bad_action() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let source = configured_source(Arc::clone(&calls)).await;
    calls.lock().unwrap().clear();

    let response = source
        .read(&json!({
            "actions": [
                ["navigate"],
                ["navigate", "about:blank"],
                ["sleep", "soon"],
                ["teleport", "#x"]
            ]
        }))
        .await;

    assert!(response.state.is_none());
    let errors: Vec<_> = response.diagnostics.errors().collect();
    assert_eq!(errors.len(), 3);
    assert!(errors.iter().all(|d| d.summary == "wrong action definition"));
    assert_eq!(errors[0].attribute.as_deref(), Some("actions[0]"));
    assert_eq!(errors[1].attribute.as_deref(), Some("actions[2]"));
    assert_eq!(errors[2].detail, "unknown action: teleport");
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_read_reports_failing_action() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let source = configured_source(Arc::clone(&calls)).await;

    let response = source
        .read(&json!({ "actions": [["click", "#missing"]] }))
        .await;

    assert!(response.state.is_none());
    let diag = response.diagnostics.errors().next().unwrap();
    assert_eq!(diag.summary, "can't process actions");
    assert!(diag.detail.contains("#missing"));
    assert_eq!(calls.lock().unwrap().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn test_read_writes_element_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shots").join("card.png");
    let calls = Arc::new(Mutex::new(Vec::new()));
    let source = configured_source(calls).await;

    let response = source
        .read(&json!({
            "actions": [["navigate", "https://example.com"]],
            "screenshot_filename": path.to_string_lossy(),
            "screenshot_selector": "#card"
        }))
        .await;

    assert!(!response.diagnostics.has_error(), "{:?}", response.diagnostics);
    assert_eq!(std::fs::read(&path).unwrap(), b"card-png");
    let state = response.state.unwrap();
    assert_eq!(state["screenshot_selector"], "#card");
}

#[tokio::test]
async fn test_unconfigured_source() {
    let provider = provider(true, Arc::new(Mutex::new(Vec::new())));
    let mut source = provider.data_sources()[0]();
    assert_eq!(source.metadata(PROVIDER_TYPE_NAME), "chromedp_recipe");
    assert!(source.configure(None).is_empty());

    let response = source.read(&json!({ "actions": [] })).await;
    assert_eq!(
        response.diagnostics.errors().next().unwrap().summary,
        "Unconfigured provider"
    );
}
