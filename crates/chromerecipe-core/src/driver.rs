//! Browser driver seam
//!
//! Recipes talk to the browser only through [`BrowserDriver`]. A
//! [`SessionFactory`] hands out one driver per recipe run, so every run starts
//! from a fresh tab.

use crate::error::Result;
use async_trait::async_trait;
use std::time::SystemTime;

/// Cookie to install in the current browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSpec {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain; the current page's URL is used when absent
    pub domain: Option<String>,
    /// Expiry time
    pub expires: SystemTime,
}

/// Operations a recipe can perform on a browser page.
///
/// Selectors are CSS selectors. Element operations act on the first node
/// matching the selector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate the current frame to a URL and wait for the load to finish
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until an element matching the selector is visible
    async fn wait_visible(&self, selector: &str) -> Result<()>;

    /// Send a mouse click to the element
    async fn click(&self, selector: &str) -> Result<()>;

    /// Focus the element
    async fn focus(&self, selector: &str) -> Result<()>;

    /// Read the element's `.value` property
    async fn value(&self, selector: &str) -> Result<String>;

    /// Read the element's text content
    async fn text_content(&self, selector: &str) -> Result<String>;

    /// Set the element's `.value` property
    async fn set_value(&self, selector: &str, value: &str) -> Result<()>;

    /// Send the Enter key to the element
    async fn press_enter(&self, selector: &str) -> Result<()>;

    /// Install a cookie
    async fn set_cookie(&self, cookie: &CookieSpec) -> Result<()>;

    /// Capture the visible viewport as PNG
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Capture a single element as PNG
    async fn element_screenshot(&self, selector: &str) -> Result<Vec<u8>>;

    /// Close the page and release the session
    async fn close(&self) -> Result<()>;
}

/// Opens browser sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a fresh session
    async fn open(&self) -> Result<Box<dyn BrowserDriver>>;

    /// Human readable description of where sessions come from
    fn describe(&self) -> String;
}
