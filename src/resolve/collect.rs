//! Capture of caller-supplied arguments.
//!
//! Nothing is evaluated here. Rates that were not supplied stay `None`, which is different from
//! being supplied as zero or as NA.

use std::collections::BTreeMap;

use crate::core::ModelClass;
use crate::core::RawValue;
use crate::core::names::{
    ACT_RATE, B_RATE, BALANCE, DI_RATE, DR_RATE, DS_RATE, REC_RATE, RATES, TRANS_RATE,
    canonical_name, suffixed,
};
use crate::errors::{ParamError, Result};

/// The well-known rates of one group (or mode).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rates {
    pub trans_rate: Option<RawValue>,
    pub act_rate: Option<RawValue>,
    pub rec_rate: Option<RawValue>,
    pub b_rate: Option<RawValue>,
    pub ds_rate: Option<RawValue>,
    pub di_rate: Option<RawValue>,
    pub dr_rate: Option<RawValue>,
}

impl Rates {
    fn slot(&mut self, name: &str) -> Option<&mut Option<RawValue>> {
        match name {
            TRANS_RATE => Some(&mut self.trans_rate),
            ACT_RATE => Some(&mut self.act_rate),
            REC_RATE => Some(&mut self.rec_rate),
            B_RATE => Some(&mut self.b_rate),
            DS_RATE => Some(&mut self.ds_rate),
            DI_RATE => Some(&mut self.di_rate),
            DR_RATE => Some(&mut self.dr_rate),
            _ => None,
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (&'static str, RawValue)> {
        let values = [
            self.trans_rate,
            self.act_rate,
            self.rec_rate,
            self.b_rate,
            self.ds_rate,
            self.di_rate,
            self.dr_rate,
        ];
        RATES
            .into_iter()
            .zip(values)
            .filter_map(|(name, value)| value.map(|value| (name, value)))
    }
}

/// All arguments of one parameter construction call.
///
/// Group 2 rates are stored without their suffix; the suffix of the model class is attached
/// when the arguments are lowered to named entries. Anything that is not a well-known rate or
/// the balance selector ends up in `extra` and is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub group1: Rates,
    pub group2: Rates,
    pub balance: Option<RawValue>,
    pub extra: BTreeMap<String, RawValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort named values into well-known slots and the extension set.
    ///
    /// Legacy aliases are mapped to their canonical names first. A name that arrives twice, for
    /// instance as `inf.prob` and as `trans.rate`, is rejected.
    pub fn collect<K, I>(model: ModelClass, values: I) -> Result<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        let suffix = model.group_suffix();
        let mut arguments = Self::new();
        for (key, value) in values {
            let name = canonical_name(key.as_ref(), suffix).into_owned();
            arguments.insert(name, value, suffix)?;
        }
        Ok(arguments)
    }

    fn insert(&mut self, name: String, value: RawValue, suffix: &str) -> Result<()> {
        let slot = if name == BALANCE {
            Some(&mut self.balance)
        } else if let Some(slot) = self.group1.slot(&name) {
            Some(slot)
        } else if let Some(base) = name.strip_suffix(suffix) {
            self.group2.slot(base)
        } else {
            None
        };

        match slot {
            Some(Some(_)) => Err(ParamError::DuplicateParameter(name)),
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None if self.extra.contains_key(&name) => Err(ParamError::DuplicateParameter(name)),
            None => {
                self.extra.insert(name, value);
                Ok(())
            }
        }
    }

    /// Lower the arguments to a name to value mapping using the given group suffix.
    pub fn into_entries(self, suffix: &str) -> BTreeMap<String, RawValue> {
        let mut entries = self.extra;
        entries.extend(
            self.group1
                .into_entries()
                .map(|(name, value)| (name.to_string(), value)),
        );
        entries.extend(
            self.group2
                .into_entries()
                .map(|(name, value)| (suffixed(name, suffix), value)),
        );
        if let Some(balance) = self.balance {
            entries.insert(BALANCE.to_string(), balance);
        }
        entries
    }
}
