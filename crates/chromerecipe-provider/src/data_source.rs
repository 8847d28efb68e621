//! The `recipe` data source
//!
//! Runs a list of browser actions in order and exposes what they captured.

use crate::diag::{Diagnostic, Diagnostics, Severity};
use crate::framework::{DataSource, ReadResponse};
use crate::provider::ProviderData;
use crate::schema::{AttrType, Attribute, Schema, Validator};
use async_trait::async_trait;
use chromerecipe_core::{Error, OutputValues, Recipe};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const DESCRIPTION: &str = r#"Recipe runs a list of actions one after another.
If "screenshot_filename" is set, a screenshot is taken after all actions ran.

Every action is a list of strings whose first string is the action name.
For most actions the second string is a CSS selector.

A quick way to get a selector: open DevTools, select the element in the DOM
(or right click it on the page and choose "Inspect"), then right click the
element in DevTools and choose Copy -> Copy selector."#;

const ACTIONS_DESCRIPTION: &str = r##"List of actions. Each action is a list of string arguments.
Supported actions:

- **navigate**: navigates the current frame to a URL.
  > ["navigate", "https://example.com"]
- **click**: clicks the first element matching the selector. A trailing "visible" waits until the element is visible.
  > ["click", "#submit", "visible"]
- **value**: reads the value of an input, textarea, select or any element with a ".value" field and stores it in "values" under the given key.
  > ["value", "#editor textarea", "code"]
- **text**: reads the text content of the first matching element and stores it in "values" under the given key.
  > ["text", "div.summary p", "description"]
- **wait_visible**: waits until the matching element is visible.
  > ["wait_visible", "body footer"]
- **focus**: focuses the matching element.
  > ["focus", "#search"]
- **set_value**: sets the ".value" of the matching element.
  > ["set_value", "#search", "chromedp"]
- **press_enter**: sends the Enter key to the matching element.
  > ["press_enter", "#search"]
- **sleep**: waits for a duration made of number and unit pairs such as "1.5h" or "1m30s". Valid units are "ns", "us", "ms", "s", "m", "h".
  > ["sleep", "3s"]
- **cookie**: sets a cookie valid for 24 hours. Arguments are name, value and an optional domain.
  > ["cookie", "key", "value", "example.com"]"##;

/// Configuration accepted by the data source
#[derive(Debug, Clone, Deserialize)]
struct RecipeConfig {
    actions: Vec<Vec<String>>,
    #[serde(default)]
    screenshot_filename: Option<String>,
    #[serde(default)]
    screenshot_selector: Option<String>,
}

/// State produced by a successful read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeState {
    /// Recipe identifier
    pub id: String,
    /// Action definitions as configured
    pub actions: Vec<Vec<String>>,
    /// Captured values
    pub values: OutputValues,
    /// Screenshot target, as configured
    pub screenshot_filename: Option<String>,
    /// Screenshot element, as configured
    pub screenshot_selector: Option<String>,
}

/// Data source running browser recipes
#[derive(Debug, Default)]
pub struct RecipeDataSource {
    data: Option<ProviderData>,
}

impl RecipeDataSource {
    /// Unconfigured data source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructor used in the provider's data source list
    #[must_use]
    pub fn boxed() -> Box<dyn DataSource> {
        Box::new(Self::new())
    }
}

/// Turn a run failure into diagnostics.
fn error_diagnostics(err: Error) -> Diagnostics {
    let mut diags = Diagnostics::new();
    match err {
        Error::InvalidActions(errors) => {
            for e in errors {
                diags.push(
                    Diagnostic {
                        severity: Severity::Error,
                        summary: "wrong action definition".to_string(),
                        detail: e.source.to_string(),
                        attribute: None,
                    }
                    .at(format!("actions[{}]", e.index)),
                );
            }
        }
        err @ Error::ScreenshotDir { .. } => {
            diags.add_error("can't create directory for the screenshot", err.to_string());
        }
        err @ Error::ScreenshotWrite { .. } => {
            diags.add_error("can't save the screenshot:", err.to_string());
        }
        other => diags.add_error("can't process actions", other.to_string()),
    }
    diags
}

#[async_trait]
impl DataSource for RecipeDataSource {
    fn metadata(&self, provider_type_name: &str) -> String {
        format!("{provider_type_name}_recipe")
    }

    fn schema(&self) -> Schema {
        Schema::new(DESCRIPTION)
            .attribute(
                "actions",
                Attribute::required(
                    AttrType::list(AttrType::list(AttrType::String)),
                    ACTIONS_DESCRIPTION,
                ),
            )
            .attribute("id", Attribute::computed(AttrType::String, "Identifier of the recipe"))
            .attribute(
                "values",
                Attribute::computed(
                    AttrType::map(AttrType::String),
                    "Map of output values from **value** and **text** actions.",
                ),
            )
            .attribute(
                "screenshot_filename",
                Attribute::optional(
                    AttrType::String,
                    "If set, a screenshot is taken at the end of the recipe and saved to this path",
                ),
            )
            .attribute(
                "screenshot_selector",
                Attribute::optional(
                    AttrType::String,
                    "Requires **screenshot_filename** to be set. Captures only the matching element",
                )
                .with_validator(Validator::AlsoRequires("screenshot_filename".to_string())),
            )
    }

    fn configure(&mut self, provider_data: Option<&ProviderData>) -> Diagnostics {
        if let Some(data) = provider_data {
            self.data = Some(data.clone());
        }
        Diagnostics::new()
    }

    async fn read(&self, config: &Value) -> ReadResponse {
        let mut diagnostics = self.schema().validate(config);
        if diagnostics.has_error() {
            return ReadResponse {
                state: None,
                diagnostics,
            };
        }

        let config: RecipeConfig = match serde_json::from_value(config.clone()) {
            Ok(config) => config,
            Err(e) => {
                diagnostics.add_error("Invalid recipe configuration", e.to_string());
                return ReadResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        let Some(data) = &self.data else {
            diagnostics.add_error(
                "Unconfigured provider",
                "the provider must be configured before the recipe can be read",
            );
            return ReadResponse {
                state: None,
                diagnostics,
            };
        };

        let recipe = Recipe {
            actions: config.actions,
            screenshot_filename: config.screenshot_filename,
            screenshot_selector: config.screenshot_selector,
        };
        debug!(actions = recipe.actions.len(), "Reading recipe");

        let outcome = match data.runner().run(&recipe).await {
            Ok(outcome) => outcome,
            Err(e) => {
                diagnostics.append(error_diagnostics(e));
                return ReadResponse {
                    state: None,
                    diagnostics,
                };
            }
        };

        let state = RecipeState {
            id: outcome.id,
            actions: recipe.actions,
            values: outcome.values,
            screenshot_filename: recipe.screenshot_filename,
            screenshot_selector: recipe.screenshot_selector,
        };

        match serde_json::to_value(&state) {
            Ok(state) => ReadResponse {
                state: Some(state),
                diagnostics,
            },
            Err(e) => {
                diagnostics.add_error("can't encode state", e.to_string());
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromerecipe_core::{parse_actions, ActionDefinitionError};
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_metadata() {
        assert_eq!(RecipeDataSource::new().metadata("chromedp"), "chromedp_recipe");
    }

    #[test]
    fn test_schema_shape() {
        let schema = RecipeDataSource::new().schema();
        let names: Vec<_> = schema.attributes.keys().cloned().collect();
        assert_eq!(
            names,
            vec![
                "actions",
                "id",
                "screenshot_filename",
                "screenshot_selector",
                "values"
            ]
        );
    }

    #[test]
    fn test_actions_description_lists_every_verb() {
        let schema = RecipeDataSource::new().schema();
        let description = &schema.attributes["actions"].description;

        assert!(description.contains(r##"["click", "#submit", "visible"]"##));
        assert!(description.ends_with(r#"["cookie", "key", "value", "example.com"]"#));
        for verb in [
            "navigate",
            "click",
            "value",
            "text",
            "wait_visible",
            "focus",
            "set_value",
            "press_enter",
            "sleep",
            "cookie",
        ] {
            assert!(description.contains(&format!("- **{verb}**")), "{verb}");
        }
    }

    #[tokio::test]
    async fn test_read_without_provider_data() {
        let source = RecipeDataSource::new();
        let response = source
            .read(&json!({ "actions": [["navigate", "about:blank"]] }))
            .await;

        assert!(response.state.is_none());
        assert_eq!(
            response.diagnostics.iter().next().unwrap().summary,
            "Unconfigured provider"
        );
    }

    #[tokio::test]
    async fn test_read_rejects_selector_without_filename() {
        let source = RecipeDataSource::new();
        let response = source
            .read(&json!({ "actions": [], "screenshot_selector": "#x" }))
            .await;

        assert!(response.diagnostics.has_error());
        assert_eq!(
            response.diagnostics.iter().next().unwrap().attribute.as_deref(),
            Some("screenshot_selector")
        );
    }

    #[test]
    fn test_error_diagnostics_per_action() {
        let errors: Vec<ActionDefinitionError> =
            parse_actions(&[vec!["navigate"], vec!["ok?"]]).unwrap_err();
        let diags = error_diagnostics(Error::InvalidActions(errors));

        let all: Vec<_> = diags.iter().collect();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|d| d.summary == "wrong action definition"));
        assert_eq!(all[0].attribute.as_deref(), Some("actions[0]"));
        assert_eq!(all[1].detail, "unknown action: ok?");
    }

    #[test]
    fn test_error_diagnostics_summaries() {
        let io = || std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");

        let diags = error_diagnostics(Error::ScreenshotDir {
            path: PathBuf::from("/root/shots"),
            source: io(),
        });
        assert_eq!(
            diags.iter().next().unwrap().summary,
            "can't create directory for the screenshot"
        );

        let diags = error_diagnostics(Error::ScreenshotWrite {
            path: PathBuf::from("a.png"),
            source: io(),
        });
        assert_eq!(diags.iter().next().unwrap().summary, "can't save the screenshot:");

        let diags = error_diagnostics(Error::Timeout(10));
        assert_eq!(diags.iter().next().unwrap().summary, "can't process actions");
    }
}
