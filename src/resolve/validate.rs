//! Structural validation and class tagging.
//!
//! Each model class has its own validator. They look alike but differ on purpose: the
//! individual-contact model must be told which group's act rate is authoritative, whereas the
//! network model leaves contact volume to the partnership structure and never asks for a
//! balance selector. The deterministic model only derives and tags.

use std::collections::BTreeMap;

use crate::core::names::{ACT_RATE, BALANCE, TRANS_RATE, VITAL_RATES};
use crate::core::{BalanceSpec, Group, ModelClass, ParameterSet, Value};
use crate::errors::{ParamError, Result};

/// Default act rate of the stochastic model classes.
pub const DEFAULT_ACT_RATE: f64 = 1.0;

/// Validate resolved values for `model` and tag them with the class.
pub fn validate(model: ModelClass, values: BTreeMap<String, Value>) -> Result<ParameterSet> {
    match model {
        ModelClass::Dcm => validate_dcm(values),
        ModelClass::Icm => validate_icm(values),
        ModelClass::Net => validate_net(values),
    }
}

/// Number of groups implied by the keys: two if any key carries the group 2 suffix.
pub fn count_groups(values: &BTreeMap<String, Value>, suffix: &str) -> usize {
    match values.keys().any(|key| key.ends_with(suffix)) {
        true => 2,
        false => 1,
    }
}

/// Whether any group 1 birth or death rate was supplied.
pub fn has_vital_rates(values: &BTreeMap<String, Value>) -> bool {
    VITAL_RATES.iter().any(|name| values.contains_key(*name))
}

fn require(values: &BTreeMap<String, Value>, name: &str) -> Result<()> {
    match values.contains_key(name) {
        true => Ok(()),
        false => Err(ParamError::MissingRequiredParameter(name.to_string())),
    }
}

fn parse_balance(value: Option<&Value>) -> Result<Group> {
    match value {
        Some(Value::Text(text)) => text
            .parse()
            .map_err(|_| ParamError::InvalidBalanceSelector(Some(text.clone()))),
        Some(other) => Err(ParamError::InvalidBalanceSelector(Some(other.to_string()))),
        None => Err(ParamError::InvalidBalanceSelector(None)),
    }
}

fn validate_dcm(values: BTreeMap<String, Value>) -> Result<ParameterSet> {
    let model = ModelClass::Dcm;
    require(&values, TRANS_RATE)?;

    let groups = count_groups(&values, model.group_suffix());
    let vital = has_vital_rates(&values);
    let balance = match (groups, values.get(BALANCE)) {
        (2, Some(selector)) => match parse_balance(Some(selector)) {
            Ok(authority) => Some(BalanceSpec::new(authority)),
            Err(_) => {
                log::warn!("Unrecognized balance selector `{selector}`, act rates are not balanced.");
                None
            }
        },
        _ => None,
    };

    Ok(ParameterSet::new(model, groups, vital, balance, values))
}

fn validate_icm(mut values: BTreeMap<String, Value>) -> Result<ParameterSet> {
    let model = ModelClass::Icm;
    require(&values, TRANS_RATE)?;

    let groups = count_groups(&values, model.group_suffix());
    values
        .entry(ACT_RATE.to_string())
        .or_insert(Value::Number(DEFAULT_ACT_RATE));
    let vital = has_vital_rates(&values);
    let balance = match groups {
        2 => Some(BalanceSpec::new(parse_balance(values.get(BALANCE))?)),
        _ => None,
    };

    Ok(ParameterSet::new(model, groups, vital, balance, values))
}

fn validate_net(mut values: BTreeMap<String, Value>) -> Result<ParameterSet> {
    let model = ModelClass::Net;
    require(&values, TRANS_RATE)?;

    let groups = count_groups(&values, model.group_suffix());
    // acts per partnership per unit time
    values
        .entry(ACT_RATE.to_string())
        .or_insert(Value::Number(DEFAULT_ACT_RATE));
    let vital = has_vital_rates(&values);
    if values.contains_key(BALANCE) {
        log::warn!("Network models balance contact volume through partnerships, ignoring `balance`.");
    }

    Ok(ParameterSet::new(model, groups, vital, None, values))
}
