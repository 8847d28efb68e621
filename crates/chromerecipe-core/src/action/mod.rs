//! Recipe Actions
//!
//! A recipe is an ordered list of actions. Each action is a list of strings
//! whose first element names a verb and whose remaining elements are the
//! verb's arguments.
//!
//! ## Supported verbs
//!
//! | verb | arguments |
//! |---|---|
//! | `navigate` | URL |
//! | `wait_visible` | selector |
//! | `click` | selector, then options (`visible`) |
//! | `value` | selector, output key |
//! | `text` | selector, output key |
//! | `focus` | selector |
//! | `sleep` | duration such as `"3s"` or `"1.5h"` |
//! | `cookie` | name, value, optional domain |
//! | `set_value` | selector, value |
//! | `press_enter` | selector |
//!
//! `value` and `text` write what they capture into the [`OutputValues`] map
//! under the given key.
//!
//! ## Usage
//!
//! ```
//! use chromerecipe_core::action::{parse_actions, BrowserAction};
//!
//! let plan = parse_actions(&[
//!     vec!["navigate".to_string(), "https://example.com".to_string()],
//!     vec!["text".to_string(), "h1".to_string(), "title".to_string()],
//! ])
//! .unwrap();
//!
//! assert_eq!(plan.actions.len(), 2);
//! assert!(plan.values.contains_key("title"));
//! ```

mod actions;
mod parser;

use std::collections::BTreeMap;
use std::time::Duration;

/// Lifetime of cookies installed by the `cookie` action
pub const COOKIE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Values captured by `value` and `text` actions, keyed by output name
pub type OutputValues = BTreeMap<String, String>;

pub use actions::BrowserAction;
pub use parser::{parse_action, parse_actions, ActionDefinitionError, ActionError, Plan};
