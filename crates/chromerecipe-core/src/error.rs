//! Error types for chromerecipe-core

use crate::action::ActionDefinitionError;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// One or more action definitions could not be parsed
    #[error("wrong action definition: {}", join_definition_errors(.0))]
    InvalidActions(Vec<ActionDefinitionError>),

    /// The browser backend reported a failure
    #[error("browser error: {0}")]
    Browser(String),

    /// Connecting to or launching the browser failed
    #[error("connection error: {0}")]
    Connection(String),

    /// An action failed while running
    #[error("action #{index} ({action}) failed: {source}")]
    ActionFailed {
        /// Position of the action in the recipe
        index: usize,
        /// Verb of the failed action
        action: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// A browser call did not finish in time
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// The screenshot directory could not be created
    #[error("can't create directory for the screenshot: {}: {source}", .path.display())]
    ScreenshotDir {
        /// Directory that was being created
        path: PathBuf,
        /// IO failure
        #[source]
        source: std::io::Error,
    },

    /// The screenshot could not be written
    #[error("can't save the screenshot: {}: {source}", .path.display())]
    ScreenshotWrite {
        /// Target file
        path: PathBuf,
        /// IO failure
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

fn join_definition_errors(errors: &[ActionDefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
