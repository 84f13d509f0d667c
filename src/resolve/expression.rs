use std::collections::BTreeMap;

use super::context::EvalContext;
use crate::core::{RawValue, Value};
use crate::errors::{ParamError, Result};

/// Turn every flattened entry into a concrete value.
///
/// Literals are taken as they are, expressions are evaluated in `context` and lists become sweep
/// sequences. The first failure aborts resolution and names its parameter.
pub fn resolve_values(
    entries: BTreeMap<String, RawValue>,
    context: &EvalContext,
) -> Result<BTreeMap<String, Value>> {
    entries
        .into_iter()
        .map(|(name, raw)| -> Result<(String, Value)> {
            let value = resolve_value(&name, raw, context)?;
            log::debug!("Resolved `{name}` to `{value}`.");
            Ok((name, value))
        })
        .collect()
}

fn resolve_value(name: &str, raw: RawValue, context: &EvalContext) -> Result<Value> {
    match raw {
        RawValue::Literal(value) => Ok(value),
        RawValue::Expression(expression) => context.evaluate(name, &expression),
        RawValue::List(items) if items.is_empty() => Err(ParamError::InvalidValue {
            name: name.to_string(),
            reason: "sweeps need at least one entry".to_string(),
        }),
        RawValue::List(items) => items
            .into_iter()
            .map(|item| -> Result<f64> {
                match resolve_value(name, item, context)? {
                    Value::Number(value) => Ok(value),
                    other => Err(ParamError::InvalidValue {
                        name: name.to_string(),
                        reason: format!("sweep entries must be numbers, found `{other}`"),
                    }),
                }
            })
            .collect::<Result<Vec<f64>>>()
            .map(Value::Sequence),
        RawValue::Nested(_) => Err(ParamError::InvalidValue {
            name: name.to_string(),
            reason: "nested mappings are only allowed at the top level".to_string(),
        }),
    }
}
