use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::balance::{ActRates, BalanceSpec, GroupSizes};
use super::model::{Group, ModelClass};
use super::names::{ACT_RATE, TRANS_RATE, suffixed};
use super::value::Value;
use crate::errors::{ParamError, Result};

/// A resolved, validated and class-tagged set of model parameters.
///
/// Parameter sets are immutable once built. The simulation loop reads them at every time step;
/// the only per-step computation is the act balancing, which derives new values without writing
/// them back (see `act_rates`).
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ParameterSet {
    model: ModelClass,
    groups: usize,
    vital: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    balance: Option<BalanceSpec>,
    parameters: BTreeMap<String, Value>,
}

impl ParameterSet {
    pub(crate) fn new(
        model: ModelClass,
        groups: usize,
        vital: bool,
        balance: Option<BalanceSpec>,
        parameters: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            model,
            groups,
            vital,
            balance,
            parameters,
        }
    }

    pub fn model(&self) -> ModelClass {
        self.model
    }

    /// Number of groups (or modes), either 1 or 2.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Whether births or deaths are active.
    pub fn vital(&self) -> bool {
        self.vital
    }

    /// Balancing mode of a two-group model, if the model class balances act rates itself.
    pub fn balance_spec(&self) -> Option<&BalanceSpec> {
        self.balance.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.parameters.iter()
    }

    pub fn trans_rate(&self) -> &Value {
        // present by construction
        &self.parameters[TRANS_RATE]
    }

    /// Name of a group 2 (or mode 2) parameter in this model class.
    pub fn group_key(&self, name: &str) -> String {
        suffixed(name, self.model.group_suffix())
    }

    /// Read a parameter as a single number.
    ///
    /// Sweep sequences of length one are accepted; longer sweeps must be split with `run` first.
    pub fn number(&self, name: &str) -> Result<f64> {
        match self.parameters.get(name) {
            Some(Value::Number(value)) => Ok(*value),
            Some(Value::Sequence(values)) if values.len() == 1 => Ok(values[0]),
            Some(other) => Err(ParamError::InvalidValue {
                name: name.to_string(),
                reason: format!("expected a single number, found `{other}`"),
            }),
            None => Err(ParamError::MissingRequiredParameter(name.to_string())),
        }
    }

    /// Common length of all sweep parameters.
    ///
    /// Sequences of length one are recycled and do not constrain the sweep. Returns 1 if the set
    /// holds no sweep. Resolution does not check this; a driver iterating runs must.
    pub fn sweep_length(&self) -> Result<usize> {
        let mut expected: Option<usize> = None;
        for (name, value) in &self.parameters {
            let Value::Sequence(values) = value else {
                continue;
            };
            let length = values.len();
            if length == 0 {
                return Err(ParamError::InvalidValue {
                    name: name.clone(),
                    reason: "sweep sequence is empty".to_string(),
                });
            }
            if length == 1 {
                continue;
            }
            match expected {
                None => expected = Some(length),
                Some(expected) if expected != length => {
                    return Err(ParamError::SweepLengthMismatch {
                        name: name.clone(),
                        length,
                        expected,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(1))
    }

    /// The single-run parameter set for sweep entry `index`, or `None` past the last run.
    pub fn run(&self, index: usize) -> Result<Option<ParameterSet>> {
        if index >= self.sweep_length()? {
            return Ok(None);
        }
        let parameters = self
            .parameters
            .iter()
            .filter_map(|(name, value)| value.at(index).map(|value| (name.clone(), value)))
            .collect();
        Ok(Some(Self {
            parameters,
            ..self.clone()
        }))
    }

    /// All single-run parameter sets of a sweep, in order.
    pub fn runs(&self) -> Result<Vec<ParameterSet>> {
        let n_runs = self.sweep_length()?;
        let mut runs = Vec::with_capacity(n_runs);
        for index in 0..n_runs {
            if let Some(run) = self.run(index)? {
                runs.push(run);
            }
        }
        Ok(runs)
    }

    /// Effective act rates of both groups for the current group sizes.
    ///
    /// Returns `None` for models without a balance spec: single-group models and network models,
    /// whose contact volume is balanced by the partnership structure. If group 2 is authoritative
    /// but `act.rate.g2` was not supplied, the group 1 `act.rate` is used as the authoritative
    /// rate.
    pub fn act_rates(&self, sizes: &GroupSizes) -> Result<Option<ActRates>> {
        let Some(spec) = self.balance.as_ref() else {
            return Ok(None);
        };
        let key = spec.authoritative_key(self.model.group_suffix());
        let rate = match (spec.authority(), self.contains(&key)) {
            (Group::G2, false) => self.number(ACT_RATE)?,
            _ => self.number(&key)?,
        };
        Ok(Some(spec.apply(rate, sizes)))
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).map_err(ParamError::YamlError)
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| fmt::Error)?;
        write!(
            formatter,
            "{}",
            String::from_utf8(output).map_err(|_| fmt::Error)?
        )
    }
}
