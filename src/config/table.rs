//! Parameter tables.
//!
//! A parameter table is a CSV file with the columns `param`, `value` and `type`. Sweep
//! sequences are spread over one `sweep` row per entry, named `name_1`, `name_2`, and so on, and
//! are collapsed back into a single sequence when the table is read. Other rows keep their name
//! as written, numbered or not.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

use crate::core::value::NA;
use crate::core::{ParameterSet, RawValue, Value};
use crate::errors::{ParamError, Result};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Numeric,
    Logical,
    Character,
    Na,
    Sweep,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TableRecord {
    pub param: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl TableRecord {
    fn new(param: String, value: String, value_type: ValueType) -> Self {
        Self {
            param,
            value,
            value_type,
        }
    }

    fn parse(&self) -> Result<Value> {
        let invalid = |reason: String| ParamError::InvalidValue {
            name: self.param.clone(),
            reason,
        };
        match self.value_type {
            ValueType::Na => Ok(Value::Na),
            ValueType::Numeric if self.value == NA => Ok(Value::Na),
            ValueType::Numeric | ValueType::Sweep => self
                .value
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|error| invalid(format!("`{}` is not numeric: {error}", self.value))),
            ValueType::Logical => match self.value.trim() {
                "TRUE" | "true" => Ok(Value::Bool(true)),
                "FALSE" | "false" => Ok(Value::Bool(false)),
                other => Err(invalid(format!("`{other}` is not logical"))),
            },
            ValueType::Character => Ok(Value::Text(self.value.clone())),
        }
    }
}

/// Split `name_3` into `("name", 3)`.
fn sweep_entry(param: &str) -> Option<(&str, usize)> {
    let (name, index) = param.rsplit_once('_')?;
    match index.parse::<usize>() {
        Ok(index) if index > 0 && !name.is_empty() => Some((name, index)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, derive_more::Deref)]
pub struct ParameterTable(Vec<TableRecord>);

impl ParameterTable {
    pub fn from_parameters(parameters: &ParameterSet) -> Self {
        let mut records = Vec::new();
        for (name, value) in parameters.iter() {
            match value {
                Value::Na => {
                    records.push(TableRecord::new(name.clone(), NA.to_string(), ValueType::Na))
                }
                Value::Number(number) => records.push(TableRecord::new(
                    name.clone(),
                    number.to_string(),
                    ValueType::Numeric,
                )),
                Value::Bool(flag) => records.push(TableRecord::new(
                    name.clone(),
                    match flag {
                        true => "TRUE".to_string(),
                        false => "FALSE".to_string(),
                    },
                    ValueType::Logical,
                )),
                Value::Text(text) => records.push(TableRecord::new(
                    name.clone(),
                    text.clone(),
                    ValueType::Character,
                )),
                Value::Sequence(values) => {
                    records.extend(values.iter().enumerate().map(|(index, number)| {
                        TableRecord::new(
                            format!("{name}_{}", index + 1),
                            number.to_string(),
                            ValueType::Sweep,
                        )
                    }))
                }
            }
        }
        Self(records)
    }

    /// Raw values ready to be collected into arguments.
    ///
    /// Sweep rows named `name_1` to `name_n` become one sequence `name`. The indices must be
    /// contiguous from 1.
    pub fn to_raw(&self) -> Result<BTreeMap<String, RawValue>> {
        let mut raw = BTreeMap::new();
        let mut sweeps: BTreeMap<String, BTreeMap<usize, f64>> = BTreeMap::new();

        for record in &self.0 {
            let value = record.parse()?;
            let sweep = match (record.value_type, &value) {
                (ValueType::Sweep, Value::Number(number)) => {
                    let (name, index) =
                        sweep_entry(&record.param).ok_or_else(|| ParamError::InvalidValue {
                            name: record.param.clone(),
                            reason: "sweep rows must be named `name_<index>`".to_string(),
                        })?;
                    Some((name, index, *number))
                }
                _ => None,
            };
            match sweep {
                Some((name, index, number)) => {
                    sweeps
                        .entry(name.to_string())
                        .or_default()
                        .insert(index, number);
                }
                None => {
                    if raw.insert(record.param.clone(), RawValue::Literal(value)).is_some() {
                        return Err(ParamError::DuplicateParameter(record.param.clone()));
                    }
                }
            }
        }

        for (name, entries) in sweeps {
            if !entries.keys().copied().eq(1..=entries.len()) {
                return Err(ParamError::InvalidValue {
                    name,
                    reason: "sweep rows must be numbered from 1 without gaps".to_string(),
                });
            }
            if raw.contains_key(&name) {
                return Err(ParamError::DuplicateParameter(name));
            }
            raw.insert(name, RawValue::from(entries.into_values().collect::<Vec<f64>>()));
        }
        Ok(raw)
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in &self.0 {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<TableRecord>, csv::Error>>()?;
        Ok(Self(records))
    }

    pub fn write_to_file(&self, filename: &str) -> Result<()> {
        let file = fs::File::create(filename)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Self> {
        let file = fs::File::open(filename)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ModelClass;
    use crate::resolve::{EvalContext, resolve_map};
    use serial_test::serial;

    fn parameters() -> ParameterSet {
        let raw = BTreeMap::from([
            ("trans.rate".to_string(), RawValue::from(vec![0.1, 0.2, 0.3])),
            ("trans.rate.m2".to_string(), RawValue::from(0.25)),
            ("di.rate".to_string(), RawValue::Literal(Value::Na)),
            ("module.enabled".to_string(), RawValue::from(true)),
            ("module.label".to_string(), RawValue::from("fast")),
        ]);
        resolve_map(ModelClass::Net, &raw, &EvalContext::new()).unwrap()
    }

    #[test]
    fn sweeps_are_spread_over_rows() {
        let table = ParameterTable::from_parameters(&parameters());
        let names: Vec<&str> = table.iter().map(|record| record.param.as_str()).collect();
        assert!(names.contains(&"trans.rate_1"));
        assert!(names.contains(&"trans.rate_3"));
        assert!(!names.contains(&"trans.rate"));
    }

    #[test]
    fn read_back_into_same_parameters() {
        let parameters = parameters();
        let mut buffer = Vec::new();
        ParameterTable::from_parameters(&parameters)
            .write(&mut buffer)
            .unwrap();

        let table = ParameterTable::read(&mut buffer.as_slice()).unwrap();
        let raw = table.to_raw().unwrap();
        let read = resolve_map(ModelClass::Net, &raw, &EvalContext::new()).unwrap();
        assert_eq!(read, parameters);
    }

    #[test]
    fn sweep_rows_need_contiguous_indices() {
        let content = "param,value,type\nact.rate_1,1,sweep\nact.rate_3,3,sweep\n";
        let table = ParameterTable::read(&mut content.as_bytes()).unwrap();
        assert!(matches!(
            table.to_raw(),
            Err(ParamError::InvalidValue { name, .. }) if name == "act.rate"
        ));
    }

    #[test]
    fn character_rows_are_not_sweeps() {
        let content = "param,value,type\nlabel_1,a,character\ntrans.rate,0.3,numeric\n";
        let table = ParameterTable::read(&mut content.as_bytes()).unwrap();
        let raw = table.to_raw().unwrap();
        assert_eq!(raw["label_1"], RawValue::from("a"));
        assert_eq!(raw["trans.rate"], RawValue::from(0.3));
    }

    #[test]
    fn invalid_numeric_value() {
        let content = "param,value,type\ntrans.rate,fast,numeric\n";
        let table = ParameterTable::read(&mut content.as_bytes()).unwrap();
        assert!(matches!(
            table.to_raw(),
            Err(ParamError::InvalidValue { name, .. }) if name == "trans.rate"
        ));
    }

    #[test]
    #[serial]
    fn read_write_file() {
        let tmp_path = std::env::temp_dir().join("test_parameter_table.csv");
        let path = tmp_path.to_str().unwrap();
        let table = ParameterTable::from_parameters(&parameters());
        table.write_to_file(path).unwrap();
        let read = ParameterTable::read_from_file(path).unwrap();
        assert_eq!(read, table);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn numbered_scalars_keep_their_name() {
        let raw = BTreeMap::from([
            ("trans.rate".to_string(), RawValue::from(0.3)),
            ("window_1".to_string(), RawValue::from(5.0)),
            ("window".to_string(), RawValue::from(vec![1.0, 2.0])),
        ]);
        let parameters = resolve_map(ModelClass::Icm, &raw, &EvalContext::new()).unwrap();

        let mut buffer = Vec::new();
        ParameterTable::from_parameters(&parameters)
            .write(&mut buffer)
            .unwrap();
        let table = ParameterTable::read(&mut buffer.as_slice()).unwrap();
        let read = resolve_map(ModelClass::Icm, &table.to_raw().unwrap(), &EvalContext::new())
            .unwrap();

        assert_eq!(read.get("window_1"), Some(&Value::Number(5.0)));
        assert_eq!(read.get("window"), Some(&Value::Sequence(vec![1.0, 2.0])));
        assert_eq!(read, parameters);
    }

    #[test]
    fn sweep_rows_need_an_index() {
        let content = "param,value,type\nact.rate,1,sweep\n";
        let table = ParameterTable::read(&mut content.as_bytes()).unwrap();
        assert!(matches!(
            table.to_raw(),
            Err(ParamError::InvalidValue { name, .. }) if name == "act.rate"
        ));
    }
}
