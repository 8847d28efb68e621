//! Chrome session
//!
//! One page in a Chrome instance, driven through CDP.

use crate::error::{Error, Result};
use crate::script;
use async_trait::async_trait;
use chromerecipe_core::{BrowserDriver, CookieSpec};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use std::future::Future;
use std::time::{Duration, UNIX_EPOCH};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How a session relates to the Chrome process behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Chrome was launched for this session and is shut down on close
    Launched,
    /// Chrome is shared; only the page is closed
    Connected,
}

/// A single Chrome page
pub struct ChromeSession {
    page: Page,
    browser: Mutex<Option<Browser>>,
    ownership: Ownership,
    handler_task: JoinHandle<()>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl std::fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeSession")
            .field("ownership", &self.ownership)
            .field("wait_timeout", &self.wait_timeout)
            .finish()
    }
}

impl ChromeSession {
    pub(crate) fn new(
        browser: Browser,
        page: Page,
        ownership: Ownership,
        handler_task: JoinHandle<()>,
        wait_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            page,
            browser: Mutex::new(Some(browser)),
            ownership,
            handler_task,
            wait_timeout,
            poll_interval,
        }
    }

    /// First element matching `selector`, waiting for it to be attached.
    async fn element(&self, selector: &str) -> Result<Element> {
        poll_until(self.wait_timeout, self.poll_interval, || async move {
            Ok::<_, Error>(self.page.find_element(selector).await.ok())
        })
        .await?
        .ok_or_else(|| Error::NoSuchElement(selector.to_string()))
    }

    async fn poll_visible(&self, selector: &str) -> Result<()> {
        let expression = script::is_visible(selector);
        let expression = expression.as_str();
        poll_until(self.wait_timeout, self.poll_interval, || async move {
            let visible = self
                .page
                .evaluate(expression)
                .await?
                .into_value::<bool>()
                .unwrap_or(false);
            Ok::<_, Error>(visible.then_some(()))
        })
        .await?
        .ok_or_else(|| Error::NotVisible {
            selector: selector.to_string(),
            waited_ms: self.wait_timeout.as_millis() as u64,
        })
    }

    async fn shutdown(&self) -> Result<()> {
        let page_closed = self.page.clone().close().await;

        let browser_closed = match self.browser.lock().await.take() {
            Some(mut browser) if self.ownership == Ownership::Launched => {
                let closed = browser.close().await.map(|_| ());
                if closed.is_ok() {
                    if let Err(e) = browser.wait().await {
                        warn!(error = %e, "Chrome did not exit cleanly");
                    }
                }
                closed
            }
            _ => Ok(()),
        };

        finish_shutdown(&self.handler_task, page_closed, browser_closed)
    }
}

/// Stop the CDP handler, then report the first close failure.
fn finish_shutdown(
    handler_task: &JoinHandle<()>,
    page_closed: std::result::Result<(), CdpError>,
    browser_closed: std::result::Result<(), CdpError>,
) -> Result<()> {
    handler_task.abort();
    page_closed?;
    browser_closed?;
    Ok(())
}

/// Retry `attempt` every `interval` until it yields a value or `timeout`
/// has passed. Errors from `attempt` end the wait immediately.
async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut attempt: F,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    loop {
        if let Some(found) = attempt().await? {
            return Ok(Some(found));
        }
        if started.elapsed() >= timeout {
            return Ok(None);
        }
        tokio::time::sleep(interval).await;
    }
}

fn cookie_param(cookie: &CookieSpec) -> Result<CookieParam> {
    let expires = cookie
        .expires
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .expires(TimeSinceEpoch::new(expires));
    if let Some(domain) = &cookie.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build().map_err(Error::Cookie)
}

fn value_to_string(value: Option<serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl BrowserDriver for ChromeSession {
    async fn navigate(&self, url: &str) -> chromerecipe_core::Result<()> {
        debug!(url, "Navigating");
        self.page.goto(url).await.map_err(Error::from)?;
        Ok(())
    }

    async fn wait_visible(&self, selector: &str) -> chromerecipe_core::Result<()> {
        Ok(self.poll_visible(selector).await?)
    }

    async fn click(&self, selector: &str) -> chromerecipe_core::Result<()> {
        let element = self.element(selector).await?;
        element.click().await.map_err(Error::from)?;
        Ok(())
    }

    async fn focus(&self, selector: &str) -> chromerecipe_core::Result<()> {
        let element = self.element(selector).await?;
        element.focus().await.map_err(Error::from)?;
        Ok(())
    }

    async fn value(&self, selector: &str) -> chromerecipe_core::Result<String> {
        let element = self.element(selector).await?;
        let value = element.property("value").await.map_err(Error::from)?;
        Ok(value_to_string(value))
    }

    async fn text_content(&self, selector: &str) -> chromerecipe_core::Result<String> {
        let element = self.element(selector).await?;
        let returns = element
            .call_js_fn(script::TEXT_CONTENT, false)
            .await
            .map_err(Error::from)?;
        Ok(value_to_string(returns.result.value))
    }

    async fn set_value(&self, selector: &str, value: &str) -> chromerecipe_core::Result<()> {
        let expression = script::set_value(selector, value);
        let expression = expression.as_str();
        poll_until(self.wait_timeout, self.poll_interval, || async move {
            let assigned = self
                .page
                .evaluate(expression)
                .await?
                .into_value::<bool>()
                .unwrap_or(false);
            Ok::<_, Error>(assigned.then_some(()))
        })
        .await?
        .ok_or_else(|| Error::NoSuchElement(selector.to_string()))?;
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> chromerecipe_core::Result<()> {
        let element = self.element(selector).await?;
        // press_key dispatches to the focused node
        element.focus().await.map_err(Error::from)?;
        element.press_key("Enter").await.map_err(Error::from)?;
        Ok(())
    }

    async fn set_cookie(&self, cookie: &CookieSpec) -> chromerecipe_core::Result<()> {
        let param = cookie_param(cookie)?;
        self.page.set_cookie(param).await.map_err(Error::from)?;
        Ok(())
    }

    async fn screenshot(&self) -> chromerecipe_core::Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();
        Ok(self.page.screenshot(params).await.map_err(Error::from)?)
    }

    async fn element_screenshot(&self, selector: &str) -> chromerecipe_core::Result<Vec<u8>> {
        let element = self.element(selector).await?;
        Ok(element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(Error::from)?)
    }

    async fn close(&self) -> chromerecipe_core::Result<()> {
        Ok(self.shutdown().await?)
    }
}
