//! Recipe runner
//!
//! A [`Recipe`] is the user-facing description of a run: the raw action
//! definitions and an optional screenshot request. [`RecipeRunner`] parses
//! the definitions, opens a browser session, executes the actions in order
//! and saves the screenshot.

use crate::action::{parse_actions, BrowserAction, OutputValues};
use crate::driver::{BrowserDriver, SessionFactory};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for a single browser call in milliseconds (60 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 60_000;

/// A list of actions to run, optionally followed by a screenshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Action definitions, each a verb followed by its arguments
    pub actions: Vec<Vec<String>>,

    /// Where to save a PNG screenshot taken after all actions ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_filename: Option<String>,

    /// Element to capture instead of the whole viewport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_selector: Option<String>,
}

/// Screenshot requested by a recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRequest {
    /// Target file
    pub path: PathBuf,
    /// Element to capture; the viewport is captured when absent
    pub selector: Option<String>,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeOutcome {
    /// Stable identifier derived from the action list
    pub id: String,
    /// Captured values
    pub values: OutputValues,
    /// Where the screenshot was written, if one was taken
    pub screenshot_path: Option<PathBuf>,
}

impl Recipe {
    /// Create a recipe from action definitions
    #[must_use]
    pub fn new(actions: Vec<Vec<String>>) -> Self {
        Self {
            actions,
            ..Default::default()
        }
    }

    /// Request a screenshot after the actions
    #[must_use]
    pub fn with_screenshot(mut self, filename: impl Into<String>, selector: Option<String>) -> Self {
        self.screenshot_filename = Some(filename.into());
        self.screenshot_selector = selector;
        self
    }

    /// Identifier of the recipe: hex SHA-256 of the compact JSON encoding of
    /// its action list.
    ///
    /// Identical action lists always produce the same id.
    #[must_use]
    pub fn id(&self) -> String {
        let canonical = serde_json::Value::from(self.actions.clone()).to_string();
        format!("{:x}", Sha256::digest(canonical.as_bytes()))
    }

    /// The screenshot request, if a non-empty filename is set
    #[must_use]
    pub fn screenshot(&self) -> Option<ScreenshotRequest> {
        let filename = self.screenshot_filename.as_deref().filter(|f| !f.is_empty())?;
        Some(ScreenshotRequest {
            path: PathBuf::from(filename),
            selector: self
                .screenshot_selector
                .clone()
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Runs recipes against sessions from a [`SessionFactory`]
#[derive(Clone)]
pub struct RecipeRunner {
    factory: Arc<dyn SessionFactory>,
    action_timeout: Duration,
}

impl std::fmt::Debug for RecipeRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeRunner")
            .field("factory", &self.factory.describe())
            .field("action_timeout", &self.action_timeout)
            .finish()
    }
}

impl RecipeRunner {
    /// Create a runner with the default action timeout
    #[must_use]
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            action_timeout: Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS),
        }
    }

    /// Override the per-call timeout
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// The session factory backing this runner
    #[must_use]
    pub fn factory(&self) -> &Arc<dyn SessionFactory> {
        &self.factory
    }

    /// Run a recipe.
    ///
    /// No browser session is opened when any action definition is invalid.
    pub async fn run(&self, recipe: &Recipe) -> Result<RecipeOutcome> {
        let plan = parse_actions(&recipe.actions).map_err(Error::InvalidActions)?;
        let screenshot = recipe.screenshot();
        if screenshot.is_none() && recipe.screenshot_selector.is_some() {
            warn!("screenshot_selector is ignored without screenshot_filename");
        }

        if let Some(request) = &screenshot {
            ensure_parent_dir(&request.path).await?;
        }

        info!(
            actions = plan.actions.len(),
            source = %self.factory.describe(),
            "Opening browser session"
        );
        let driver = self.factory.open().await?;

        let mut values = plan.values;
        let result = self
            .drive(driver.as_ref(), &plan.actions, &mut values, screenshot.as_ref())
            .await;

        if let Err(e) = driver.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        let picture = result?;

        let screenshot_path = match (screenshot, picture) {
            (Some(request), Some(bytes)) => {
                tokio::fs::write(&request.path, &bytes)
                    .await
                    .map_err(|source| Error::ScreenshotWrite {
                        path: request.path.clone(),
                        source,
                    })?;
                debug!(path = %request.path.display(), size = bytes.len(), "Screenshot saved");
                Some(request.path)
            }
            _ => None,
        };

        Ok(RecipeOutcome {
            id: recipe.id(),
            values,
            screenshot_path,
        })
    }

    async fn drive(
        &self,
        driver: &dyn BrowserDriver,
        actions: &[BrowserAction],
        values: &mut OutputValues,
        screenshot: Option<&ScreenshotRequest>,
    ) -> Result<Option<Vec<u8>>> {
        for (index, action) in actions.iter().enumerate() {
            debug!(index, action = action.name(), "Executing action");
            let outcome = if action.uses_browser() {
                self.timed(action.execute(driver, values)).await
            } else {
                action.execute(driver, values).await
            };
            outcome.map_err(|source| Error::ActionFailed {
                index,
                action: action.name(),
                source: Box::new(source),
            })?;
        }

        let Some(request) = screenshot else {
            return Ok(None);
        };

        let bytes = match &request.selector {
            Some(selector) => {
                self.timed(driver.wait_visible(selector)).await?;
                self.timed(driver.element_screenshot(selector)).await?
            }
            None => self.timed(driver.screenshot()).await?,
        };
        Ok(Some(bytes))
    }

    async fn timed<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.action_timeout, call)
            .await
            .map_err(|_| Error::Timeout(self.action_timeout.as_millis() as u64))?
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| Error::ScreenshotDir {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockBrowserDriver;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Hands out pre-built mock drivers, one per `open` call.
    struct MockFactory {
        drivers: Mutex<Vec<MockBrowserDriver>>,
        opened: AtomicUsize,
    }

    impl MockFactory {
        fn new(driver: MockBrowserDriver) -> Arc<Self> {
            Arc::new(Self {
                drivers: Mutex::new(vec![driver]),
                opened: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SessionFactory for MockFactory {
        async fn open(&self) -> Result<Box<dyn BrowserDriver>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let driver = self
                .drivers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| Error::Connection("no more drivers".to_string()))?;
            Ok(Box::new(driver))
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    fn recipe(actions: &[&[&str]]) -> Recipe {
        Recipe::new(
            actions
                .iter()
                .map(|a| a.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_invalid_actions_never_open_a_session() {
        let factory = MockFactory::new(MockBrowserDriver::new());
        let runner = RecipeRunner::new(factory.clone());

        let err = runner
            .run(&recipe(&[&["navigate"], &["teleport", "mars"]]))
            .await
            .unwrap_err();

        match err {
            Error::InvalidActions(errors) => assert_eq!(errors.len(), 2),
            other => panic!("Expected InvalidActions, got {:?}", other),
        }
        assert_eq!(factory.opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_captures_values_in_order() {
        let mut seq = mockall::Sequence::new();
        let mut driver = MockBrowserDriver::new();
        driver
            .expect_navigate()
            .withf(|url| url == "https://example.com")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        driver
            .expect_text_content()
            .withf(|selector| selector == "h1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("Example Domain".to_string()));
        driver
            .expect_value()
            .withf(|selector| selector == "input")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("typed".to_string()));
        driver.expect_close().times(1).returning(|| Ok(()));

        let runner = RecipeRunner::new(MockFactory::new(driver));
        let r = recipe(&[
            &["navigate", "https://example.com"],
            &["text", "h1", "title"],
            &["value", "input", "field"],
        ]);
        let outcome = runner.run(&r).await.unwrap();

        assert_eq!(outcome.id, r.id());
        assert_eq!(outcome.values.get("title").unwrap(), "Example Domain");
        assert_eq!(outcome.values.get("field").unwrap(), "typed");
        assert!(outcome.screenshot_path.is_none());
    }

    #[tokio::test]
    async fn test_failure_stops_run_and_closes_session() {
        let mut driver = MockBrowserDriver::new();
        driver
            .expect_click()
            .returning(|_| Err(Error::Browser("node not found".to_string())));
        driver.expect_focus().never();
        driver.expect_close().times(1).returning(|| Ok(()));

        let runner = RecipeRunner::new(MockFactory::new(driver));
        let err = runner
            .run(&recipe(&[&["click", "#missing"], &["focus", "#next"]]))
            .await
            .unwrap_err();

        match err {
            Error::ActionFailed { index, action, .. } => {
                assert_eq!(index, 0);
                assert_eq!(action, "click");
            }
            other => panic!("Expected ActionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_viewport_screenshot_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots").join("page.png");

        let mut driver = MockBrowserDriver::new();
        driver.expect_navigate().returning(|_| Ok(()));
        driver
            .expect_screenshot()
            .times(1)
            .returning(|| Ok(vec![0x89, b'P', b'N', b'G']));
        driver.expect_element_screenshot().never();
        driver.expect_close().returning(|| Ok(()));

        let runner = RecipeRunner::new(MockFactory::new(driver));
        let r = recipe(&[&["navigate", "about:blank"]])
            .with_screenshot(path.to_string_lossy(), None);
        let outcome = runner.run(&r).await.unwrap();

        assert_eq!(outcome.screenshot_path.as_deref(), Some(path.as_path()));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_element_screenshot_waits_for_selector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("element.png");

        let mut seq = mockall::Sequence::new();
        let mut driver = MockBrowserDriver::new();
        driver
            .expect_wait_visible()
            .withf(|selector| selector == "#chart")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        driver
            .expect_element_screenshot()
            .withf(|selector| selector == "#chart")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![1, 2, 3]));
        driver.expect_screenshot().never();
        driver.expect_close().returning(|| Ok(()));

        let runner = RecipeRunner::new(MockFactory::new(driver));
        let r = Recipe::new(vec![])
            .with_screenshot(path.to_string_lossy(), Some("#chart".to_string()));
        runner.run(&r).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_browser_call_times_out() {
        let runner = RecipeRunner::new(MockFactory::new(MockBrowserDriver::new()))
            .with_action_timeout(Duration::from_millis(10));

        let err = runner
            .timed(std::future::pending::<Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(10)));
    }

    #[test]
    fn test_recipe_id_is_stable() {
        let a = recipe(&[&["navigate", "https://example.com"]]);
        let b = recipe(&[&["navigate", "https://example.com"]]);
        let c = recipe(&[&["navigate", "https://example.org"]]);
        let d = recipe(&[&["navigatehttps://example.com"]]);

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_ne!(a.id(), d.id());
        assert_eq!(a.id().len(), 64);
    }

    #[test]
    fn test_recipe_id_hashes_action_json() {
        let r = recipe(&[&["navigate", "https://example.com"]]);
        assert_eq!(
            r.id(),
            "8ace0029b150f3252b4cbf2d02c08646a9c936bb11e137a74d7836dc7d5b6c3e"
        );
    }

    #[test]
    fn test_screenshot_request_requires_filename() {
        let mut r = Recipe::new(vec![]);
        r.screenshot_selector = Some("#x".to_string());
        assert!(r.screenshot().is_none());

        let r = Recipe::new(vec![]).with_screenshot("", None);
        assert!(r.screenshot().is_none());

        let r = Recipe::new(vec![]).with_screenshot("out/a.png", Some(String::new()));
        assert_eq!(
            r.screenshot(),
            Some(ScreenshotRequest {
                path: PathBuf::from("out/a.png"),
                selector: None,
            })
        );
    }
}
