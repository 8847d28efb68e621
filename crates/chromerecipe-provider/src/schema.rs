//! Schema declaration and validation
//!
//! Schemas describe the attributes a provider or data source accepts. They
//! are serialized for `chromerecipe schema` and used to check incoming
//! configuration before it is decoded.

use crate::diag::{Diagnostic, Diagnostics, Severity};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute value type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "element")]
pub enum AttrType {
    /// String
    String,
    /// List of values of one type
    List(Box<AttrType>),
    /// String-keyed map of values of one type
    Map(Box<AttrType>),
}

impl AttrType {
    /// List of `inner`
    #[must_use]
    pub fn list(inner: AttrType) -> Self {
        Self::List(Box::new(inner))
    }

    /// Map of `inner`
    #[must_use]
    pub fn map(inner: AttrType) -> Self {
        Self::Map(Box::new(inner))
    }

    fn describe(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::List(inner) => format!("list of {}", inner.describe()),
            Self::Map(inner) => format!("map of {}", inner.describe()),
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_)) => true,
            (Self::List(inner), Value::Array(items)) => items.iter().all(|v| inner.matches(v)),
            (Self::Map(inner), Value::Object(entries)) => {
                entries.values().all(|v| inner.matches(v))
            }
            _ => false,
        }
    }
}

/// Who sets an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Must be set in configuration
    Required,
    /// May be set in configuration
    Optional,
    /// Set by the provider
    Computed,
}

/// Attribute validators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "attribute")]
pub enum Validator {
    /// The named sibling attribute must be set whenever this one is
    AlsoRequires(String),
}

/// Attribute declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Value type
    #[serde(rename = "value_type")]
    pub ty: AttrType,
    /// Who sets it
    pub mode: Mode,
    /// Markdown description
    pub description: String,
    /// Extra checks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(ty: AttrType, mode: Mode, description: impl Into<String>) -> Self {
        Self {
            ty,
            mode,
            description: description.into(),
            validators: Vec::new(),
        }
    }

    /// Required attribute
    #[must_use]
    pub fn required(ty: AttrType, description: impl Into<String>) -> Self {
        Self::new(ty, Mode::Required, description)
    }

    /// Optional attribute
    #[must_use]
    pub fn optional(ty: AttrType, description: impl Into<String>) -> Self {
        Self::new(ty, Mode::Optional, description)
    }

    /// Computed attribute
    #[must_use]
    pub fn computed(ty: AttrType, description: impl Into<String>) -> Self {
        Self::new(ty, Mode::Computed, description)
    }

    /// Add a validator
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// A set of attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    /// Markdown description
    pub description: String,
    /// Attributes by name
    pub attributes: BTreeMap<String, Attribute>,
}

fn is_set(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null))
}

fn attribute_error(name: &str, summary: &str, detail: String) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: summary.to_string(),
        detail,
        attribute: None,
    }
    .at(name)
}

impl Schema {
    /// Schema with a description
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Check a configuration object against the schema.
    pub fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let Some(object) = config.as_object() else {
            diags.add_error(
                "Invalid configuration",
                format!("expected an object, got {config}"),
            );
            return diags;
        };

        for key in object.keys() {
            if !self.attributes.contains_key(key) {
                diags.push(attribute_error(
                    key,
                    "Unsupported argument",
                    format!("an argument named \"{key}\" is not expected here"),
                ));
            }
        }

        for (name, attribute) in &self.attributes {
            let value = object.get(name);
            match attribute.mode {
                Mode::Required if !is_set(value) => {
                    diags.push(attribute_error(
                        name,
                        "Missing required argument",
                        format!("the argument \"{name}\" is required, but no definition was found"),
                    ));
                    continue;
                }
                Mode::Computed if is_set(value) => {
                    diags.push(attribute_error(
                        name,
                        "Invalid configuration",
                        format!("\"{name}\" is computed and cannot be set"),
                    ));
                    continue;
                }
                _ => {}
            }

            let Some(value) = value.filter(|v| !v.is_null()) else {
                continue;
            };
            if !attribute.ty.matches(value) {
                diags.push(attribute_error(
                    name,
                    "Incorrect attribute value type",
                    format!("\"{name}\" must be a {}", attribute.ty.describe()),
                ));
                continue;
            }

            for validator in &attribute.validators {
                match validator {
                    Validator::AlsoRequires(other) => {
                        if !is_set(object.get(other)) {
                            diags.push(attribute_error(
                                name,
                                "Invalid Attribute Combination",
                                format!(
                                    "Attribute \"{other}\" must be specified when \"{name}\" is specified"
                                ),
                            ));
                        }
                    }
                }
            }
        }

        diags
    }
}
