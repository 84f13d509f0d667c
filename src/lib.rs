//! Parameter resolution and act balancing for epidemic models.
//!
//! Deterministic compartmental, stochastic individual-contact and stochastic network models
//! all start from the same step: caller arguments are resolved into an immutable, validated
//! `ParameterSet` tagged with its model class. Two-group models additionally balance their act
//! rates at every time step so that both groups contribute the same contact volume.

pub mod args;
pub mod config;
pub mod core;
pub mod errors;
pub mod resolve;
pub mod runner;

pub use crate::core::{
    ActRates, BalanceSpec, Group, GroupSizes, ModelClass, ParameterSet, RawValue, Value,
    balance_act_rate,
};
pub use crate::errors::{ParamError, Result};
pub use crate::resolve::{Arguments, EvalContext, param_dcm, param_icm, param_net, resolve};
