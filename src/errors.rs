//! All errors that can occur while resolving epidemic parameters.

use std::fmt;

pub type Result<T> = std::result::Result<T, ParamError>;

#[derive(Debug)]
pub enum ParamError {
    /// A parameter every model class needs was not supplied.
    MissingRequiredParameter(String),

    /// A two-group individual-contact model without a usable `balance` selector. Holds the
    /// offending value, if any was given.
    InvalidBalanceSelector(Option<String>),

    /// A deferred expression could not be evaluated in the caller's context.
    ExpressionEvaluation { name: String, message: String },

    /// The same parameter was supplied twice, e.g. under its canonical name and a legacy alias.
    DuplicateParameter(String),

    /// A sweep parameter whose length disagrees with the other sweep parameters.
    SweepLengthMismatch {
        name: String,
        length: usize,
        expected: usize,
    },

    /// A parameter holds a value that cannot be used where it is requested.
    InvalidValue { name: String, reason: String },

    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
    CsvError(csv::Error),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParamError::MissingRequiredParameter(name) => {
                write!(f, "required parameter missing: `{name}`")
            }
            ParamError::InvalidBalanceSelector(None) => write!(
                f,
                "required selector missing or invalid: two-group models need `balance` set to \"g1\" or \"g2\""
            ),
            ParamError::InvalidBalanceSelector(Some(value)) => write!(
                f,
                "required selector missing or invalid: `balance` is {value:?}, expected \"g1\" or \"g2\""
            ),
            ParamError::ExpressionEvaluation { name, message } => {
                write!(f, "unable to evaluate parameter `{name}`: {message}")
            }
            ParamError::DuplicateParameter(name) => {
                write!(f, "parameter `{name}` supplied more than once")
            }
            ParamError::SweepLengthMismatch {
                name,
                length,
                expected,
            } => write!(
                f,
                "sweep parameter `{name}` has length {length}, expected 1 or {expected}"
            ),
            ParamError::InvalidValue { name, reason } => {
                write!(f, "invalid value for parameter `{name}`: {reason}")
            }
            ParamError::IoError(error) => write!(f, "IO error: {error}"),
            ParamError::YamlError(error) => write!(f, "YAML error: {error}"),
            ParamError::CsvError(error) => write!(f, "CSV error: {error}"),
        }
    }
}

impl std::error::Error for ParamError {}

impl From<std::io::Error> for ParamError {
    fn from(error: std::io::Error) -> Self {
        ParamError::IoError(error)
    }
}

impl From<serde_yaml::Error> for ParamError {
    fn from(error: serde_yaml::Error) -> Self {
        ParamError::YamlError(error)
    }
}

impl From<csv::Error> for ParamError {
    fn from(error: csv::Error) -> Self {
        ParamError::CsvError(error)
    }
}
