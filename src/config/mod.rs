//! Configuration data structures for model setups.

mod schedule;
mod settings;
mod table;

pub use schedule::{StepMatcher, UpdateRecord, UpdateSchedule};
pub use settings::Settings;
pub use table::{ParameterTable, TableRecord, ValueType};
