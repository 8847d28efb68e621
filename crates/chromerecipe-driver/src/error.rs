//! Error types for chromerecipe-driver

use chromiumoxide::error::CdpError;
use thiserror::Error;

/// Driver error type
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol-level failure reported by chromiumoxide
    #[error("cdp error: {0}")]
    Cdp(#[from] CdpError),

    /// Browser configuration could not be built
    #[error("invalid browser configuration: {0}")]
    Config(String),

    /// Launching or connecting to Chrome failed
    #[error("cannot reach chrome at {target}: {source}")]
    Connect {
        /// Endpoint or "local chrome"
        target: String,
        /// Underlying failure
        #[source]
        source: CdpError,
    },

    /// No element matches the selector
    #[error("no element matches selector {0:?}")]
    NoSuchElement(String),

    /// An element did not become visible in time
    #[error("element {selector:?} not visible after {waited_ms}ms")]
    NotVisible {
        /// Selector being waited for
        selector: String,
        /// How long we waited
        waited_ms: u64,
    },

    /// A cookie could not be built
    #[error("invalid cookie: {0}")]
    Cookie(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for chromerecipe_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Connect { .. } | Error::Config(_) => Self::Connection(err.to_string()),
            other => Self::Browser(other.to_string()),
        }
    }
}
