//! Act balancing between two groups of unequal size.
//!
//! In a two-group model the number of acts group 1 has with group 2 must equal the number of
//! acts group 2 has with group 1. One group's act rate is taken as given and the other one is
//! solved for from the current group sizes:
//!
//! ```text
//! size_g1 * rate_g1 == size_g2 * rate_g2
//! ```
//!
//! Group sizes change under vital dynamics, so the balanced rate is recomputed from live state at
//! every time step. Nothing here holds state.

use serde::{Deserialize, Serialize};

use super::model::Group;
use super::names::{ACT_RATE, suffixed};

/// Current sizes of both groups.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GroupSizes {
    pub g1: f64,
    pub g2: f64,
}

impl GroupSizes {
    pub fn new(g1: f64, g2: f64) -> Self {
        Self { g1, g2 }
    }

    pub fn of(&self, group: Group) -> f64 {
        match group {
            Group::G1 => self.g1,
            Group::G2 => self.g2,
        }
    }
}

/// Effective act rates of both groups for one time step.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ActRates {
    pub g1: f64,
    pub g2: f64,
}

impl ActRates {
    pub fn of(&self, group: Group) -> f64 {
        match group {
            Group::G1 => self.g1,
            Group::G2 => self.g2,
        }
    }
}

/// Compute the act rate of the group opposite to `authority`.
///
/// `rate` is the act rate of the authoritative group. An empty (or otherwise non-positive)
/// dependent group has no contact volume to carry, so the result is `0.0` instead of a division
/// by zero.
pub fn balance_act_rate(authority: Group, rate: f64, sizes: &GroupSizes) -> f64 {
    let authoritative = sizes.of(authority);
    let dependent = sizes.of(authority.other());
    if !dependent.is_finite() || dependent <= 0.0 {
        return 0.0;
    }
    rate * authoritative / dependent
}

/// Which group's act rate is authoritative in a balanced two-group model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSpec {
    authority: Group,
}

impl BalanceSpec {
    pub fn new(authority: Group) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> Group {
        self.authority
    }

    pub fn dependent(&self) -> Group {
        self.authority.other()
    }

    /// Name of the act rate parameter that is taken as given.
    pub fn authoritative_key(&self, suffix: &str) -> String {
        act_rate_key(self.authority(), suffix)
    }

    /// Name of the act rate parameter that is recomputed at each step.
    pub fn dependent_key(&self, suffix: &str) -> String {
        act_rate_key(self.dependent(), suffix)
    }

    /// Balanced rates for both groups given the authoritative rate and the current sizes.
    pub fn apply(&self, rate: f64, sizes: &GroupSizes) -> ActRates {
        let balanced = balance_act_rate(self.authority, rate, sizes);
        match self.authority {
            Group::G1 => ActRates {
                g1: rate,
                g2: balanced,
            },
            Group::G2 => ActRates {
                g1: balanced,
                g2: rate,
            },
        }
    }
}

fn act_rate_key(group: Group, suffix: &str) -> String {
    match group {
        Group::G1 => ACT_RATE.to_string(),
        Group::G2 => suffixed(ACT_RATE, suffix),
    }
}
