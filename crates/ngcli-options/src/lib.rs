//! Option model shared by the ngcli argument parser and help renderer.
//!
//! An [`OptionModel`] describes a single command-line option: its canonical
//! name, the type(s) it accepts, its aliases, an optional positional slot and
//! an optional enum constraint. Option lists are usually produced from a
//! command's JSON Schema by [`parse_json_schema_to_options`].

use serde::{Serialize, Serializer};
use std::fmt;

pub mod schema;

pub use schema::{SchemaError, parse_json_schema_to_options};

/// Type accepted by an option on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Any,
    Array,
    Boolean,
    Number,
    String,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Map a JSON Schema `type` keyword to an option type.
    ///
    /// `integer` is folded into `number`; `object` and `null` have no
    /// command-line form.
    pub fn from_schema_type(raw: &str) -> Option<Self> {
        match raw {
            "any" => Some(Self::Any),
            "array" => Some(Self::Array),
            "boolean" => Some(Self::Boolean),
            "number" | "integer" => Some(Self::Number),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<String>),
}

impl Value {
    /// Convert a scalar JSON value. Objects, arrays and `null` yield `None`.
    pub fn from_json_scalar(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }
}

fn integral(n: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up, so the upper bound is exclusive.
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => match integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
        }
    }
}

/// Renders the value as JSON (`"text"`, `1`, `true`, `["a","b"]`).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::Array(items)
    }
}

/// Deprecation marker projected from `x-deprecated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Deprecation {
    Flag(bool),
    Message(String),
}

/// Descriptor of a single command-line option.
///
/// Option models are never mutated by the parser and can be shared across
/// concurrent parses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionModel {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Ordered alternatives; when set, replaces `option_type` during coercion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<OptionType>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional: Option<usize>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub required: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecation>,
}

impl OptionModel {
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            option_type,
            types: None,
            aliases: Vec::new(),
            positional: None,
            enum_values: None,
            default: None,
            format: None,
            required: false,
            hidden: false,
            deprecated: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !self.aliases.contains(&alias) {
            self.aliases.push(alias);
        }
        self
    }

    pub fn types(mut self, types: impl IntoIterator<Item = OptionType>) -> Self {
        let types: Vec<OptionType> = types.into_iter().collect();
        if let Some(first) = types.first() {
            self.option_type = *first;
        }
        self.types = Some(types);
        self
    }

    pub fn positional(mut self, index: usize) -> Self {
        self.positional = Some(index);
        self
    }

    pub fn enum_values(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Types tried during coercion, in order.
    pub fn accepted_types(&self) -> &[OptionType] {
        match &self.types {
            Some(types) if !types.is_empty() => types.as_slice(),
            _ => std::slice::from_ref(&self.option_type),
        }
    }

    /// Whether `value` satisfies the enum constraint (always true without one).
    pub fn permits(&self, value: &Value) -> bool {
        self.enum_values
            .as_ref()
            .is_none_or(|allowed| allowed.contains(value))
    }
}
