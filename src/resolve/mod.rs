//! Resolution of caller arguments into canonical parameter sets.
//!
//! Resolution runs in four stages, each feeding the next:
//!
//! 1. `collect`: capture the arguments with well-known rates in their own slots.
//! 2. `split`: flatten nested qualifier mappings into `outer.inner` entries.
//! 3. `expression`: evaluate deferred expressions against an `EvalContext`.
//! 4. `validate`: derive groups and vital dynamics, apply defaults and requirements, and tag
//!    the set with its model class.
//!
//! Any failure aborts resolution before a parameter set exists.

mod collect;
mod context;
mod expression;
mod split;
mod validate;

pub use collect::{Arguments, Rates};
pub use context::EvalContext;
pub use expression::resolve_values;
pub use split::{SEPARATOR, split_lists};
pub use validate::{DEFAULT_ACT_RATE, count_groups, has_vital_rates, validate};

use std::collections::BTreeMap;

use crate::core::{ModelClass, ParameterSet, RawValue};
use crate::errors::Result;

/// Resolve `arguments` into a parameter set of class `model`.
pub fn resolve(
    model: ModelClass,
    arguments: Arguments,
    context: &EvalContext,
) -> Result<ParameterSet> {
    log::debug!("Resolving {model} parameters...");
    let entries = arguments.into_entries(model.group_suffix());
    let entries = split_lists(entries);
    let values = resolve_values(entries, context)?;
    let parameters = validate(model, values)?;
    log::info!("Resolved {model} parameters\n{parameters}");
    Ok(parameters)
}

/// Parameters of a deterministic compartmental model.
pub fn param_dcm(arguments: Arguments, context: &EvalContext) -> Result<ParameterSet> {
    resolve(ModelClass::Dcm, arguments, context)
}

/// Parameters of a stochastic individual-contact model.
pub fn param_icm(arguments: Arguments, context: &EvalContext) -> Result<ParameterSet> {
    resolve(ModelClass::Icm, arguments, context)
}

/// Parameters of a stochastic network model.
pub fn param_net(arguments: Arguments, context: &EvalContext) -> Result<ParameterSet> {
    resolve(ModelClass::Net, arguments, context)
}

impl ParameterSet {
    /// A new parameter set with `arguments` resolved over the current values.
    ///
    /// The result passes the same validation as a freshly resolved set, so an update that adds
    /// a group 2 rate to an individual-contact model must also supply `balance`.
    pub fn update(&self, arguments: Arguments, context: &EvalContext) -> Result<ParameterSet> {
        let model = self.model();
        let entries = split_lists(arguments.into_entries(model.group_suffix()));
        let updates = resolve_values(entries, context)?;

        let mut values = self.parameters().clone();
        for (name, value) in updates {
            log::debug!("Updating `{name}` to `{value}`.");
            values.insert(name, value);
        }
        validate(model, values)
    }

    /// Like `update`, starting from an open name to value mapping.
    pub fn update_from<K, I>(&self, values: I, context: &EvalContext) -> Result<ParameterSet>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        self.update(Arguments::collect(self.model(), values)?, context)
    }
}

/// Resolve an open name to value mapping, e.g. one read from a settings file.
pub fn resolve_map(
    model: ModelClass,
    values: &BTreeMap<String, RawValue>,
    context: &EvalContext,
) -> Result<ParameterSet> {
    let arguments = Arguments::collect(model, values.iter().map(|(k, v)| (k, v.clone())))?;
    resolve(model, arguments, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Group, GroupSizes, Value, balance_act_rate};
    use crate::errors::ParamError;

    fn icm(values: &[(&str, RawValue)]) -> Result<ParameterSet> {
        let arguments = Arguments::collect(ModelClass::Icm, values.iter().cloned())?;
        param_icm(arguments, &EvalContext::new())
    }

    #[test]
    fn one_group_defaults() {
        let set = icm(&[("trans.rate", RawValue::from(0.3))]).unwrap();
        assert_eq!(set.model(), ModelClass::Icm);
        assert_eq!(set.groups(), 1);
        assert_eq!(set.get("act.rate"), Some(&Value::Number(1.0)));
        assert!(!set.vital());
        assert!(set.balance_spec().is_none());
        assert!(
            set.act_rates(&GroupSizes::new(100.0, 0.0))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn two_groups_balanced_on_group_one() {
        let set = icm(&[
            ("trans.rate", RawValue::from(0.3)),
            ("trans.rate.g2", RawValue::from(0.2)),
            ("balance", RawValue::from("g1")),
        ])
        .unwrap();
        assert_eq!(set.groups(), 2);
        assert_eq!(set.balance_spec().unwrap().authority(), Group::G1);
    }

    #[test]
    fn two_groups_without_balance() {
        let result = icm(&[
            ("trans.rate", RawValue::from(0.3)),
            ("trans.rate.g2", RawValue::from(0.2)),
        ]);
        assert!(matches!(result, Err(ParamError::InvalidBalanceSelector(None))));
    }

    #[test]
    fn network_with_vital_dynamics() {
        let arguments = Arguments::collect(
            ModelClass::Net,
            [
                ("trans.rate", RawValue::from(0.3)),
                ("b.rate", RawValue::from(0.01)),
                ("ds.rate", RawValue::from(0.01)),
            ],
        )
        .unwrap();
        let set = param_net(arguments, &EvalContext::new()).unwrap();
        assert!(set.vital());
        assert_eq!(set.get("act.rate"), Some(&Value::Number(1.0)));
        assert!(set.balance_spec().is_none());
    }

    #[test]
    fn network_modes_need_no_balance() {
        let arguments = Arguments::collect(
            ModelClass::Net,
            [
                ("trans.rate", RawValue::from(0.3)),
                ("trans.rate.m2", RawValue::from(0.2)),
            ],
        )
        .unwrap();
        let set = param_net(arguments, &EvalContext::new()).unwrap();
        assert_eq!(set.groups(), 2);
        assert!(
            set.act_rates(&GroupSizes::new(10.0, 20.0))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn balancing_scenario() {
        let sizes = GroupSizes::new(100.0, 50.0);
        assert_eq!(balance_act_rate(Group::G2, 4.0, &sizes), 2.0);
    }

    #[test]
    fn missing_transmission_rate() {
        let result = icm(&[("act.rate", RawValue::from(2.0))]);
        assert!(matches!(
            result,
            Err(ParamError::MissingRequiredParameter(name)) if name == "trans.rate"
        ));
    }

    #[test]
    fn expressions_and_nested_qualifiers() {
        let context = EvalContext::new().with("birth", 0.5).unwrap();
        let arguments = Arguments::collect(
            ModelClass::Dcm,
            [
                ("inf.prob", RawValue::from(0.3)),
                ("b.rate", RawValue::expr("birth")),
                ("ds.rate", RawValue::expr("birth / 2")),
                (
                    "inter",
                    RawValue::Nested(BTreeMap::from([
                        ("eff".to_string(), RawValue::from(0.8)),
                        ("start".to_string(), RawValue::from(25.0)),
                    ])),
                ),
            ],
        )
        .unwrap();
        let set = param_dcm(arguments, &context).unwrap();
        assert_eq!(set.trans_rate(), &Value::Number(0.3));
        assert_eq!(set.get("ds.rate"), Some(&Value::Number(0.25)));
        assert_eq!(set.get("inter.eff"), Some(&Value::Number(0.8)));
        assert_eq!(set.get("inter.start"), Some(&Value::Number(25.0)));
        assert!(set.vital());
    }

    #[test]
    fn failing_expression_aborts() {
        let arguments = Arguments::collect(
            ModelClass::Icm,
            [
                ("trans.rate", RawValue::from(0.3)),
                ("rec.rate", RawValue::expr("duration_unknown")),
            ],
        )
        .unwrap();
        let result = param_icm(arguments, &EvalContext::new());
        assert!(matches!(
            result,
            Err(ParamError::ExpressionEvaluation { name, .. }) if name == "rec.rate"
        ));
    }

    #[test]
    fn extension_values_pass_through() {
        let set = icm(&[
            ("trans.rate", RawValue::from(0.3)),
            ("module.threshold", RawValue::from(12.0)),
            ("module.label", RawValue::from("fast")),
        ])
        .unwrap();
        assert_eq!(set.get("module.threshold"), Some(&Value::Number(12.0)));
        assert_eq!(set.get("module.label"), Some(&Value::from("fast")));
    }

    #[test]
    fn update_resolves_over_existing_values() {
        let set = icm(&[
            ("trans.rate", RawValue::from(0.3)),
            ("rec.rate", RawValue::from(0.1)),
        ])
        .unwrap();
        let context = EvalContext::new().with("half", 0.5).unwrap();
        let updated = set
            .update_from([("trans.rate", RawValue::expr("half"))], &context)
            .unwrap();
        assert_eq!(updated.trans_rate(), &Value::Number(0.5));
        assert_eq!(updated.get("rec.rate"), Some(&Value::Number(0.1)));
        assert_eq!(set.trans_rate(), &Value::Number(0.3));
    }

    #[test]
    fn update_revalidates() {
        let set = icm(&[("trans.rate", RawValue::from(0.3))]).unwrap();
        let result = set.update_from(
            [("trans.rate.g2", RawValue::from(0.2))],
            &EvalContext::new(),
        );
        assert!(matches!(result, Err(ParamError::InvalidBalanceSelector(None))));

        let updated = set
            .update_from(
                [
                    ("trans.rate.g2", RawValue::from(0.2)),
                    ("balance", RawValue::from("g2")),
                ],
                &EvalContext::new(),
            )
            .unwrap();
        assert_eq!(updated.groups(), 2);
        assert_eq!(updated.balance_spec().unwrap().authority(), Group::G2);
    }

    #[test]
    fn sweep_from_list() {
        let set = icm(&[
            (
                "trans.rate",
                RawValue::List(vec![0.1.into(), 0.2.into(), 0.3.into()]),
            ),
            ("act.rate", RawValue::from(2.0)),
        ])
        .unwrap();
        assert_eq!(set.sweep_length().unwrap(), 3);
        let runs = set.runs().unwrap();
        assert_eq!(runs[2].trans_rate(), &Value::Number(0.3));
        assert_eq!(runs[2].get("act.rate"), Some(&Value::Number(2.0)));
    }
}
