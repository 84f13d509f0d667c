//! Evaluation context for deferred parameter expressions.
//!
//! Parameters are often written as formulas over variables the caller defined elsewhere, e.g. a
//! death rate expressed as a fraction of a birth rate. The context holds those variables. It is
//! filled by the caller and only read during resolution.

use evalexpr::{ContextWithMutableVariables, HashMapContext};
use std::collections::BTreeMap;

use crate::core::Value;
use crate::errors::{ParamError, Result};

pub struct EvalContext {
    context: HashMapContext,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalContext {
    pub fn new() -> Self {
        Self {
            context: HashMapContext::new(),
        }
    }

    /// Build a context from named values.
    pub fn from_variables<'a, I>(variables: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut context = Self::new();
        for (name, value) in variables {
            context.set(name, value)?;
        }
        Ok(context)
    }

    /// Define or overwrite a variable.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        self.context
            .set_value(name.to_string(), to_evalexpr(value))
            .map_err(|error| ParamError::InvalidValue {
                name: name.to_string(),
                reason: error.to_string(),
            })
    }

    /// Builder form of `set`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, &value.into())?;
        Ok(self)
    }

    /// Evaluate `expression` on behalf of the parameter `name`.
    pub fn evaluate(&self, name: &str, expression: &str) -> Result<Value> {
        let failure = |message: String| ParamError::ExpressionEvaluation {
            name: name.to_string(),
            message,
        };
        let value = evalexpr::eval_with_context(expression, &self.context)
            .map_err(|error| failure(error.to_string()))?;
        from_evalexpr(value).map_err(failure)
    }
}

fn to_evalexpr(value: &Value) -> evalexpr::Value {
    match value {
        Value::Na => evalexpr::Value::Empty,
        Value::Bool(value) => evalexpr::Value::Boolean(*value),
        Value::Number(value) => evalexpr::Value::Float(*value),
        Value::Sequence(values) => evalexpr::Value::Tuple(
            values
                .iter()
                .map(|&value| evalexpr::Value::Float(value))
                .collect(),
        ),
        Value::Text(text) => evalexpr::Value::String(text.clone()),
    }
}

fn from_evalexpr(value: evalexpr::Value) -> std::result::Result<Value, String> {
    match value {
        evalexpr::Value::Empty => Ok(Value::Na),
        evalexpr::Value::Boolean(value) => Ok(Value::Bool(value)),
        evalexpr::Value::Float(value) => Ok(Value::Number(value)),
        evalexpr::Value::Int(value) => Ok(Value::Number(value as f64)),
        evalexpr::Value::String(text) => Ok(Value::Text(text)),
        evalexpr::Value::Tuple(items) => items
            .into_iter()
            .map(|item| match item {
                evalexpr::Value::Float(value) => Ok(value),
                evalexpr::Value::Int(value) => Ok(value as f64),
                other => Err(format!("sequence entries must be numbers, found `{other}`")),
            })
            .collect::<std::result::Result<Vec<f64>, String>>()
            .map(Value::Sequence),
    }
}

impl TryFrom<&BTreeMap<String, Value>> for EvalContext {
    type Error = ParamError;

    fn try_from(variables: &BTreeMap<String, Value>) -> Result<Self> {
        Self::from_variables(variables)
    }
}
