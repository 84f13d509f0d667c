//! Model class discriminant and group selectors.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The family of epidemic model a parameter set was resolved for.
///
/// Downstream consumers dispatch on this tag.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ModelClass {
    /// Deterministic compartmental model integrated as an ODE system.
    #[serde(rename = "dcm")]
    #[display("dcm")]
    Dcm,

    /// Stochastic individual-contact model without an explicit network.
    #[serde(rename = "icm")]
    #[display("icm")]
    Icm,

    /// Stochastic network model with transmission along partnership edges.
    #[serde(rename = "net")]
    #[display("net")]
    Net,
}

impl ModelClass {
    /// Suffix of second group (or mode) parameters.
    ///
    /// Network models are bipartite and name their second partition a mode.
    pub fn group_suffix(&self) -> &'static str {
        match self {
            ModelClass::Dcm | ModelClass::Icm => ".g2",
            ModelClass::Net => ".m2",
        }
    }
}

/// One of the two groups (or modes) of a population.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Group {
    #[serde(rename = "g1")]
    #[display("g1")]
    G1,
    #[serde(rename = "g2")]
    #[display("g2")]
    G2,
}

impl Group {
    pub fn other(&self) -> Group {
        match self {
            Group::G1 => Group::G2,
            Group::G2 => Group::G1,
        }
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "g1" => Ok(Group::G1),
            "g2" => Ok(Group::G2),
            other => Err(format!("unknown group `{other}`")),
        }
    }
}
