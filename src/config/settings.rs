//! Settings module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use super::schedule::UpdateSchedule;
use crate::core::{ModelClass, ParameterSet, RawValue, Value};
use crate::errors::{ParamError, Result};
use crate::resolve::{EvalContext, resolve_map};

/// A model configuration as stored on disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// The model class the parameters are resolved for.
    pub model: ModelClass,

    /// Variables available to `!expr` parameter expressions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,

    /// Raw model parameters, including any extension values.
    pub parameters: BTreeMap<String, RawValue>,

    /// Parameter updates applied at later time steps.
    #[serde(default, skip_serializing_if = "UpdateSchedule::is_empty")]
    pub schedule: UpdateSchedule,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut output = vec![];
        self.write(&mut output).map_err(|_| std::fmt::Error)?;
        write!(
            formatter,
            "{}",
            String::from_utf8(output).map_err(|_| std::fmt::Error)?
        )
    }
}

impl Settings {
    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).map_err(ParamError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Settings> {
        serde_yaml::from_reader(reader).map_err(ParamError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<()> {
        let file = fs::File::create(filename)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Settings> {
        let file = fs::File::open(filename)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }

    pub fn context(&self) -> Result<EvalContext> {
        EvalContext::from_variables(&self.variables)
    }

    pub fn resolve(&self) -> Result<ParameterSet> {
        resolve_map(self.model, &self.parameters, &self.context()?)
    }

    /// The parameter set in effect at `step`, after all scheduled updates up to and including
    /// that step.
    pub fn resolve_at(&self, step: usize) -> Result<ParameterSet> {
        let context = self.context()?;
        let mut parameters = resolve_map(self.model, &self.parameters, &context)?;
        for current in 0..=step {
            if let Some(updated) = self.schedule.parameters_at(&parameters, current, &context)? {
                parameters = updated;
            }
        }
        Ok(parameters)
    }
}
