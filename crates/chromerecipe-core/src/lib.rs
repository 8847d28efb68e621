//! chromerecipe Core - Action Interpreter and Recipe Runner
//!
//! This crate provides the engine behind the `recipe` data source:
//! - Action: parses string-list action definitions into typed browser commands
//! - Driver: the seam between recipes and a concrete browser backend
//! - Recipe: runs a parsed action list against a browser session

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod driver;
pub mod duration;
pub mod error;
pub mod recipe;

pub use action::{
    parse_action, parse_actions, ActionDefinitionError, ActionError, BrowserAction,
    OutputValues, Plan,
};
pub use driver::{BrowserDriver, CookieSpec, SessionFactory};
pub use error::{Error, Result};
pub use recipe::{Recipe, RecipeOutcome, RecipeRunner, ScreenshotRequest};
