//! Parameter values before and after resolution.
//!
//! A `RawValue` is what a caller hands in: a literal, a deferred expression, a list of scalars
//! meant for a sensitivity sweep, or a mapping of qualifiers. A `Value` is what remains once
//! nested mappings are flattened and expressions are evaluated.

use serde::{Deserialize, Serialize};
use serde_yaml::value::{Tag, TaggedValue};
use std::collections::BTreeMap;
use std::fmt;

/// YAML tag marking a deferred expression, e.g. `ds.rate: !expr "b.rate * 0.5"`.
pub const EXPRESSION_TAG: &str = "expr";

/// Literal spelling of a missing value.
pub const NA: &str = "NA";

/// A concrete parameter value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Na,
    Bool(bool),
    Number(f64),
    Sequence(Vec<f64>),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    /// Number of sweep entries held by the value. Scalars count as one.
    pub fn len(&self) -> usize {
        match self {
            Value::Sequence(values) => values.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Select entry `index` of a sweep. Scalars and length-one sequences are recycled.
    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            Value::Sequence(values) if values.len() == 1 => Some(Value::Number(values[0])),
            Value::Sequence(values) => values.get(index).map(|&value| Value::Number(value)),
            scalar => Some(scalar.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Na => write!(f, "{NA}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Number(value) => write!(f, "{value}"),
            Value::Sequence(values) => {
                write!(f, "{}", itertools::join(values.iter(), ", "))
            }
            Value::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Sequence(values)
    }
}

/// An unresolved parameter value as supplied by the caller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "serde_yaml::Value", into = "serde_yaml::Value")]
pub enum RawValue {
    Literal(Value),
    Expression(String),
    List(Vec<RawValue>),
    Nested(BTreeMap<String, RawValue>),
}

impl RawValue {
    /// Create a deferred expression.
    pub fn expr(expression: &str) -> Self {
        RawValue::Expression(expression.to_string())
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, RawValue::Nested(_))
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Literal(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Literal(Value::Number(value))
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Literal(Value::Bool(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Literal(Value::Text(value.to_string()))
    }
}

impl From<Vec<f64>> for RawValue {
    fn from(values: Vec<f64>) -> Self {
        RawValue::Literal(Value::Sequence(values))
    }
}

impl TryFrom<serde_yaml::Value> for RawValue {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value as Yaml;

        match value {
            Yaml::Null => Ok(RawValue::Literal(Value::Na)),
            Yaml::Bool(value) => Ok(RawValue::Literal(Value::Bool(value))),
            Yaml::Number(number) => number
                .as_f64()
                .map(|value| RawValue::Literal(Value::Number(value)))
                .ok_or_else(|| format!("unsupported number `{number}`")),
            Yaml::String(text) if text == NA => Ok(RawValue::Literal(Value::Na)),
            Yaml::String(text) => Ok(RawValue::Literal(Value::Text(text))),
            Yaml::Sequence(items) => items
                .into_iter()
                .map(RawValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(RawValue::List),
            Yaml::Mapping(mapping) => mapping
                .into_iter()
                .map(|(key, value)| match key {
                    Yaml::String(key) => Ok((key, RawValue::try_from(value)?)),
                    other => Err(format!("mapping keys must be strings, found `{other:?}`")),
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(RawValue::Nested),
            Yaml::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                if tag != EXPRESSION_TAG {
                    return Err(format!("unknown tag `{tag}`"));
                }
                match value {
                    Yaml::String(expression) => Ok(RawValue::Expression(expression)),
                    other => Err(format!("`!{EXPRESSION_TAG}` expects a string, found `{other:?}`")),
                }
            }
        }
    }
}

impl From<Value> for serde_yaml::Value {
    fn from(value: Value) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            Value::Na => Yaml::Null,
            Value::Bool(value) => Yaml::Bool(value),
            Value::Number(value) => Yaml::Number(value.into()),
            Value::Sequence(values) => Yaml::Sequence(
                values
                    .into_iter()
                    .map(|value| Yaml::Number(value.into()))
                    .collect(),
            ),
            Value::Text(text) => Yaml::String(text),
        }
    }
}

impl From<RawValue> for serde_yaml::Value {
    fn from(value: RawValue) -> Self {
        use serde_yaml::Value as Yaml;

        match value {
            RawValue::Literal(value) => value.into(),
            RawValue::Expression(expression) => Yaml::Tagged(Box::new(TaggedValue {
                tag: Tag::new(EXPRESSION_TAG),
                value: Yaml::String(expression),
            })),
            RawValue::List(items) => Yaml::Sequence(items.into_iter().map(Into::into).collect()),
            RawValue::Nested(entries) => Yaml::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (Yaml::String(key), value.into()))
                    .collect(),
            ),
        }
    }
}
