//! Action definition parser
//!
//! Turns `["verb", "arg", ...]` string lists into [`BrowserAction`]s.

use super::actions::BrowserAction;
use super::OutputValues;
use crate::duration::{parse_duration, DurationError};
use thiserror::Error;

/// Why a single action definition was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The definition has no verb
    #[error("malformed action")]
    Empty,

    /// The verb is not recognised
    #[error("unknown action: {0}")]
    UnknownVerb(String),

    /// Wrong number of arguments for the verb
    #[error("{verb} action expects {expected}, got {got}: {args:?}")]
    Arity {
        /// Verb being parsed
        verb: &'static str,
        /// Human readable argument contract
        expected: &'static str,
        /// Number of arguments supplied
        got: usize,
        /// Arguments supplied
        args: Vec<String>,
    },

    /// The `sleep` duration could not be parsed
    #[error("can't parse duration for sleep: {0}")]
    InvalidDuration(#[from] DurationError),
}

/// An [`ActionError`] together with the position of the offending action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("action #{index} {definition:?}: {source}")]
pub struct ActionDefinitionError {
    /// Position of the action in the recipe
    pub index: usize,
    /// The raw definition
    pub definition: Vec<String>,
    /// What was wrong with it
    #[source]
    pub source: ActionError,
}

/// Parsed actions plus the output map their captures write into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Actions in execution order
    pub actions: Vec<BrowserAction>,
    /// Output map with every capture key registered as an empty string
    pub values: OutputValues,
}

fn arity_error<S: AsRef<str>>(
    verb: &'static str,
    expected: &'static str,
    args: &[S],
) -> ActionError {
    ActionError::Arity {
        verb,
        expected,
        got: args.len(),
        args: args.iter().map(|a| a.as_ref().to_string()).collect(),
    }
}

/// Parse a single action definition.
pub fn parse_action<S: AsRef<str>>(definition: &[S]) -> Result<BrowserAction, ActionError> {
    let (verb, args) = definition.split_first().ok_or(ActionError::Empty)?;
    let arg = |i: usize| args[i].as_ref().to_string();

    match verb.as_ref() {
        "navigate" => {
            if args.len() != 1 {
                return Err(arity_error("navigate", "only 1 argument (URL)", args));
            }
            Ok(BrowserAction::Navigate { url: arg(0) })
        }
        "wait_visible" => {
            if args.len() != 1 {
                return Err(arity_error(
                    "wait_visible",
                    "only 1 argument (selector)",
                    args,
                ));
            }
            Ok(BrowserAction::WaitVisible { selector: arg(0) })
        }
        "click" => {
            if args.is_empty() {
                return Err(arity_error(
                    "click",
                    "at least 1 argument (selector and options)",
                    args,
                ));
            }
            // Unrecognised options are ignored.
            let wait_visible = args[1..].iter().any(|opt| opt.as_ref() == "visible");
            Ok(BrowserAction::Click {
                selector: arg(0),
                wait_visible,
            })
        }
        "value" => {
            if args.len() != 2 {
                return Err(arity_error(
                    "value",
                    "2 arguments (selector and value name)",
                    args,
                ));
            }
            Ok(BrowserAction::Value {
                selector: arg(0),
                slot: arg(1),
            })
        }
        "focus" => {
            if args.len() != 1 {
                return Err(arity_error("focus", "only 1 argument (selector)", args));
            }
            Ok(BrowserAction::Focus { selector: arg(0) })
        }
        "sleep" => {
            if args.len() != 1 {
                return Err(arity_error("sleep", "only 1 argument (duration)", args));
            }
            let duration = parse_duration(args[0].as_ref())?;
            Ok(BrowserAction::Sleep { duration })
        }
        "text" => {
            if args.len() != 2 {
                return Err(arity_error(
                    "text",
                    "2 arguments (selector and value name)",
                    args,
                ));
            }
            Ok(BrowserAction::Text {
                selector: arg(0),
                slot: arg(1),
            })
        }
        "cookie" => {
            if !(2..=3).contains(&args.len()) {
                return Err(arity_error(
                    "cookie",
                    "2 or 3 arguments (cookie name, value, and optional domain)",
                    args,
                ));
            }
            let domain = args
                .get(2)
                .map(|d| d.as_ref().to_string())
                .filter(|d| !d.is_empty());
            Ok(BrowserAction::Cookie {
                name: arg(0),
                value: arg(1),
                domain,
            })
        }
        "set_value" => {
            if args.len() != 2 {
                return Err(arity_error(
                    "set_value",
                    "2 arguments (selector and value)",
                    args,
                ));
            }
            Ok(BrowserAction::SetValue {
                selector: arg(0),
                value: arg(1),
            })
        }
        "press_enter" => {
            if args.len() != 1 {
                return Err(arity_error(
                    "press_enter",
                    "only 1 argument (selector)",
                    args,
                ));
            }
            Ok(BrowserAction::PressEnter { selector: arg(0) })
        }
        other => Err(ActionError::UnknownVerb(other.to_string())),
    }
}

/// Parse every action definition of a recipe.
///
/// All definitions are checked, so the error list reports every bad action
/// rather than only the first one. Any error rejects the whole list.
pub fn parse_actions<D, S>(definitions: &[D]) -> Result<Plan, Vec<ActionDefinitionError>>
where
    D: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut plan = Plan::default();
    let mut errors = Vec::new();

    for (index, definition) in definitions.iter().enumerate() {
        let definition = definition.as_ref();
        match parse_action(definition) {
            Ok(action) => {
                if let Some(slot) = action.output_slot() {
                    plan.values.insert(slot.to_string(), String::new());
                }
                plan.actions.push(action);
            }
            Err(source) => errors.push(ActionDefinitionError {
                index,
                definition: definition.iter().map(|s| s.as_ref().to_string()).collect(),
                source,
            }),
        }
    }

    if errors.is_empty() {
        Ok(plan)
    } else {
        Err(errors)
    }
}
