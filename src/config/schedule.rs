//! Time-varying parameter updates.
//!
//! A schedule lists parameter updates together with the time steps they apply to. A step is
//! either given literally or as an expression over `step` (alias `x`) that matches when it
//! evaluates to zero, e.g. `step % 52` for a yearly update on a weekly time scale.

use evalexpr::{ContextWithMutableVariables, DefaultNumericTypes, HashMapContext};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use crate::core::{ParameterSet, RawValue};
use crate::errors::{ParamError, Result};
use crate::resolve::EvalContext;

/// When an update applies.
///
/// Text that reads as a plain integer is a literal step, whether it comes from YAML or CSV.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepMatcher {
    Step(usize),
    Expression(String),
}

impl<'de> Deserialize<'de> for StepMatcher {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Step(usize),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Step(step) => StepMatcher::Step(step),
            Repr::Text(text) => StepMatcher::parse(&text),
        })
    }
}

impl StepMatcher {
    fn parse(value: &str) -> Self {
        match value.trim().parse::<usize>() {
            Ok(step) => StepMatcher::Step(step),
            Err(_) => StepMatcher::Expression(value.to_string()),
        }
    }

    pub fn matches(&self, step: usize) -> Result<bool> {
        match self {
            StepMatcher::Step(at) => Ok(*at == step),
            StepMatcher::Expression(expression) => {
                let failure = |message: String| ParamError::ExpressionEvaluation {
                    name: format!("at `{expression}`"),
                    message,
                };
                let mut context = HashMapContext::<DefaultNumericTypes>::new();
                for variable in ["x", "step"] {
                    context
                        .set_value(variable.into(), evalexpr::Value::Int(step as i64))
                        .map_err(|error| failure(error.to_string()))?;
                }
                evalexpr::eval_int_with_context(expression.as_str(), &context)
                    .map(|result| result == 0)
                    .map_err(|error| failure(error.to_string()))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UpdateRecord {
    pub at: StepMatcher,
    pub parameters: BTreeMap<String, RawValue>,
}

/// Row of a `;` separated schedule table with columns `at;parameter;value`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
struct ScheduleRow {
    at: String,
    parameter: String,
    value: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, derive_more::Deref)]
#[serde(transparent)]
pub struct UpdateSchedule(Vec<UpdateRecord>);

impl UpdateSchedule {
    pub fn new(records: Vec<UpdateRecord>) -> Self {
        Self(records)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn read(filename: &str) -> Result<Self> {
        let mut reader = BufReader::new(File::open(filename)?);
        Self::from_reader(&mut reader)
    }

    /// Read a schedule table.
    ///
    /// Values are parsed as YAML, so `!expr` tags and `[0.1, 0.2]` sweeps work as in settings
    /// files. Consecutive rows with the same `at` form one update.
    pub fn from_reader(reader: &mut dyn std::io::Read) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(reader);

        let rows: Vec<ScheduleRow> = reader
            .deserialize()
            .collect::<std::result::Result<Vec<ScheduleRow>, csv::Error>>()?;

        let mut records = Vec::new();
        for (at, rows) in &rows.into_iter().chunk_by(|row| row.at.clone()) {
            let parameters = rows
                .map(|row| -> Result<(String, RawValue)> {
                    let value: RawValue = serde_yaml::from_str(&row.value)?;
                    Ok((row.parameter, value))
                })
                .collect::<Result<BTreeMap<_, _>>>()?;
            records.push(UpdateRecord {
                at: StepMatcher::parse(&at),
                parameters,
            });
        }
        Ok(Self(records))
    }

    /// Updates that apply at `step`, in schedule order.
    pub fn records_at(&self, step: usize) -> Result<Vec<&UpdateRecord>> {
        let mut records = Vec::new();
        for record in &self.0 {
            if record.at.matches(step)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// The parameter set in effect after applying all updates for `step` to `base`.
    ///
    /// Returns `None` if nothing is scheduled for `step`.
    pub fn parameters_at(
        &self,
        base: &ParameterSet,
        step: usize,
        context: &EvalContext,
    ) -> Result<Option<ParameterSet>> {
        let records = self.records_at(step)?;
        if records.is_empty() {
            return Ok(None);
        }
        let mut parameters = base.clone();
        for record in records {
            log::info!("Applying scheduled update at step {step}.");
            parameters = parameters.update_from(
                record.parameters.iter().map(|(k, v)| (k, v.clone())),
                context,
            )?;
        }
        Ok(Some(parameters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ModelClass, Value};
    use crate::resolve::resolve_map;

    fn base() -> ParameterSet {
        let parameters = BTreeMap::from([
            ("trans.rate".to_string(), RawValue::from(0.3)),
            ("rec.rate".to_string(), RawValue::from(0.1)),
        ]);
        resolve_map(ModelClass::Icm, &parameters, &EvalContext::new()).unwrap()
    }

    #[test]
    fn literal_steps() {
        let content = r#"at;parameter;value
10;trans.rate;0.2
10;rec.rate;0.05
20;trans.rate;0.1"#;
        let schedule = UpdateSchedule::from_reader(&mut content.as_bytes()).unwrap();
        assert_eq!(schedule.len(), 2);

        let base = base();
        let context = EvalContext::new();
        assert!(schedule.parameters_at(&base, 5, &context).unwrap().is_none());

        let at_10 = schedule.parameters_at(&base, 10, &context).unwrap().unwrap();
        assert_eq!(at_10.trans_rate(), &Value::Number(0.2));
        assert_eq!(at_10.get("rec.rate"), Some(&Value::Number(0.05)));

        let at_20 = schedule.parameters_at(&base, 20, &context).unwrap().unwrap();
        assert_eq!(at_20.trans_rate(), &Value::Number(0.1));
        assert_eq!(at_20.get("rec.rate"), Some(&Value::Number(0.1)));
    }

    #[test]
    fn expression_steps() {
        let content = r#"at;parameter;value
step % 10;act.rate;2
(5 + step) % 10;act.rate;3"#;
        let schedule = UpdateSchedule::from_reader(&mut content.as_bytes()).unwrap();
        let base = base();
        let context = EvalContext::new();

        for step in 0..=100 {
            let updated = schedule.parameters_at(&base, step, &context).unwrap();
            if step % 10 == 0 {
                assert_eq!(updated.unwrap().get("act.rate"), Some(&Value::Number(2.0)));
            } else if (5 + step) % 10 == 0 {
                assert_eq!(updated.unwrap().get("act.rate"), Some(&Value::Number(3.0)));
            } else {
                assert!(updated.is_none());
            }
        }
    }

    #[test]
    fn deferred_values() {
        let content = r#"at;parameter;value
3;trans.rate;!expr "peak * 2""#;
        let schedule = UpdateSchedule::from_reader(&mut content.as_bytes()).unwrap();
        let context = EvalContext::new().with("peak", 0.25).unwrap();
        let updated = schedule.parameters_at(&base(), 3, &context).unwrap().unwrap();
        assert_eq!(updated.trans_rate(), &Value::Number(0.5));
    }

    #[test]
    fn invalid_step_expression() {
        let schedule = UpdateSchedule::new(vec![UpdateRecord {
            at: StepMatcher::Expression("step %".to_string()),
            parameters: BTreeMap::new(),
        }]);
        assert!(matches!(
            schedule.records_at(1),
            Err(ParamError::ExpressionEvaluation { .. })
        ));
    }

    #[test]
    fn read_from_yaml() {
        let yaml = r#"
- at: 4
  parameters:
    trans.rate: 0.2
- at: step % 2
  parameters:
    act.rate: [1, 2]
"#;
        let schedule: UpdateSchedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedule[0].at, StepMatcher::Step(4));
        assert_eq!(schedule[1].at, StepMatcher::Expression("step % 2".to_string()));
    }

    #[test]
    fn quoted_steps_are_literal() {
        let yaml = r#"
- at: "4"
  parameters:
    trans.rate: 0.2
"#;
        let schedule: UpdateSchedule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schedule[0].at, StepMatcher::Step(4));
        let matched: Vec<usize> = (0..10)
            .filter(|&step| schedule[0].at.matches(step).unwrap())
            .collect();
        assert_eq!(matched, vec![4]);
    }

    #[test]
    fn step_variable_aliases() {
        let by_x = StepMatcher::Expression("x - 7".to_string());
        let by_step = StepMatcher::Expression("step - 7".to_string());
        assert!(by_x.matches(7).unwrap());
        assert!(by_step.matches(7).unwrap());
        assert!(!by_step.matches(8).unwrap());
    }
}
