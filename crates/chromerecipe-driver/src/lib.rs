//! chromerecipe Driver - Chrome DevTools Protocol backend
//!
//! Implements the [`BrowserDriver`](chromerecipe_core::BrowserDriver) seam on
//! top of `chromiumoxide`:
//! - Config: where Chrome comes from and how it is launched
//! - Factory: launches a local Chrome or connects to a remote one per session
//! - Session: one page driven through CDP

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod factory;
mod script;
pub mod session;

/// Environment variable consulted for the remote endpoint
pub const ENDPOINT_ENV: &str = "CHROMEDP_ENDPOINT";

pub use config::DriverConfig;
pub use error::{Error, Result};
pub use factory::ChromeFactory;
pub use session::ChromeSession;
