//! This module contains the core datatypes of the library.

pub mod balance;
pub mod model;
pub mod names;
pub mod parameters;
pub mod value;

pub use balance::{ActRates, BalanceSpec, GroupSizes, balance_act_rate};
pub use model::{Group, ModelClass};
pub use parameters::ParameterSet;
pub use value::{RawValue, Value};
