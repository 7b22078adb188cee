//! Compatibility groups
//!
//! Units convert into each other only within a group. Groups are fixed at
//! compile time; a registry never merges or splits them.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::UnitError;

/// A family of linearly inter-convertible units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitGroup {
    /// Liquid volume, base unit liter
    Liquid,
    /// Solid weight, base unit gram
    Weight,
    /// Seed counts, base unit one seed
    Seed,
    /// Harvest yield, base unit bushel
    Yield,
    /// Land area, base unit acre
    Area,
}

impl UnitGroup {
    /// Every group in registration order
    pub const ALL: [UnitGroup; 5] = [
        UnitGroup::Liquid,
        UnitGroup::Weight,
        UnitGroup::Seed,
        UnitGroup::Yield,
        UnitGroup::Area,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            UnitGroup::Liquid => "liquid",
            UnitGroup::Weight => "weight",
            UnitGroup::Seed => "seed",
            UnitGroup::Yield => "yield",
            UnitGroup::Area => "area",
        }
    }
}

impl fmt::Display for UnitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for UnitGroup {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "liquid" => Ok(UnitGroup::Liquid),
            "weight" | "solid" => Ok(UnitGroup::Weight),
            "seed" => Ok(UnitGroup::Seed),
            "yield" | "bushel" => Ok(UnitGroup::Yield),
            "area" => Ok(UnitGroup::Area),
            other => Err(UnitError::UnknownGroup(other.to_string())),
        }
    }
}
