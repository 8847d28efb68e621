//! Browser actions
//!
//! Defines the typed commands a recipe can run and how each one is carried
//! out against a [`BrowserDriver`].

use super::{OutputValues, COOKIE_TTL};
use crate::driver::{BrowserDriver, CookieSpec};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Browser action types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BrowserAction {
    /// Navigate the current frame to a URL
    Navigate {
        /// URL to navigate to
        url: String,
    },

    /// Wait until an element is visible
    WaitVisible {
        /// CSS selector to wait for
        selector: String,
    },

    /// Click on an element
    Click {
        /// CSS selector for the element
        selector: String,
        /// Wait for the element to be visible before clicking
        #[serde(default)]
        wait_visible: bool,
    },

    /// Capture the `.value` of a form element
    Value {
        /// CSS selector for the element
        selector: String,
        /// Output key the value is stored under
        slot: String,
    },

    /// Capture the text content of an element
    Text {
        /// CSS selector for the element
        selector: String,
        /// Output key the text is stored under
        slot: String,
    },

    /// Focus an element
    Focus {
        /// CSS selector for the element
        selector: String,
    },

    /// Pause the recipe
    Sleep {
        /// How long to pause
        duration: Duration,
    },

    /// Set a cookie that expires a day after it is set
    Cookie {
        /// Cookie name
        name: String,
        /// Cookie value
        value: String,
        /// Optional cookie domain
        #[serde(default)]
        domain: Option<String>,
    },

    /// Set the `.value` of a form element
    SetValue {
        /// CSS selector for the element
        selector: String,
        /// Value to set
        value: String,
    },

    /// Send the Enter key to an element
    PressEnter {
        /// CSS selector for the element
        selector: String,
    },
}

impl BrowserAction {
    /// Get the action name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::WaitVisible { .. } => "wait_visible",
            Self::Click { .. } => "click",
            Self::Value { .. } => "value",
            Self::Text { .. } => "text",
            Self::Focus { .. } => "focus",
            Self::Sleep { .. } => "sleep",
            Self::Cookie { .. } => "cookie",
            Self::SetValue { .. } => "set_value",
            Self::PressEnter { .. } => "press_enter",
        }
    }

    /// Output key this action writes into, if it captures anything
    #[must_use]
    pub fn output_slot(&self) -> Option<&str> {
        match self {
            Self::Value { slot, .. } | Self::Text { slot, .. } => Some(slot),
            _ => None,
        }
    }

    /// Whether the action talks to the browser, as opposed to a local pause.
    /// Browser calls are subject to the per-action timeout.
    #[must_use]
    pub fn uses_browser(&self) -> bool {
        !matches!(self, Self::Sleep { .. })
    }

    /// Run the action against a driver, storing captured output in `values`.
    pub async fn execute(
        &self,
        driver: &dyn BrowserDriver,
        values: &mut OutputValues,
    ) -> Result<()> {
        match self {
            Self::Navigate { url } => driver.navigate(url).await,
            Self::WaitVisible { selector } => driver.wait_visible(selector).await,
            Self::Click {
                selector,
                wait_visible,
            } => {
                if *wait_visible {
                    driver.wait_visible(selector).await?;
                }
                driver.click(selector).await
            }
            Self::Value { selector, slot } => {
                let value = driver.value(selector).await?;
                debug!(slot = %slot, len = value.len(), "Captured value");
                values.insert(slot.clone(), value);
                Ok(())
            }
            Self::Text { selector, slot } => {
                let text = driver.text_content(selector).await?;
                debug!(slot = %slot, len = text.len(), "Captured text");
                values.insert(slot.clone(), text);
                Ok(())
            }
            Self::Focus { selector } => driver.focus(selector).await,
            Self::Sleep { duration } => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
            Self::Cookie {
                name,
                value,
                domain,
            } => {
                let cookie = CookieSpec {
                    name: name.clone(),
                    value: value.clone(),
                    domain: domain.clone(),
                    expires: SystemTime::now() + COOKIE_TTL,
                };
                driver.set_cookie(&cookie).await
            }
            Self::SetValue { selector, value } => driver.set_value(selector, value).await,
            Self::PressEnter { selector } => driver.press_enter(selector).await,
        }
    }
}
