//! Unit descriptors and conversion errors

use std::fmt;
use serde::{Serialize, Deserialize};
use agri_core::AgriError;
use crate::UnitGroup;

/// A registered unit: its group and linear ratio to the group base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Compatibility group (e.g. liquid, weight)
    pub group: UnitGroup,
    /// Multiply by this to express a value in the group base unit
    pub base_ratio: f64,
    /// Stable identifier every alias of this unit resolves to (e.g. "gal")
    pub canonical_key: String,
    /// Singular full name (e.g. "gallon")
    pub full_name: String,
}

impl UnitDescriptor {
    pub fn new(group: UnitGroup, base_ratio: f64, canonical_key: &str, full_name: &str) -> Self {
        UnitDescriptor {
            group,
            base_ratio,
            canonical_key: canonical_key.to_string(),
            full_name: full_name.to_string(),
        }
    }

    /// Check if both descriptors belong to the same group
    pub fn is_compatible(&self, other: &UnitDescriptor) -> bool {
        self.group == other.group
    }

    /// Scale a value expressed in this unit into `target`
    pub fn convert_value(&self, value: f64, target: &UnitDescriptor) -> Result<f64, UnitError> {
        if !self.is_compatible(target) {
            return Err(UnitError::Incompatible {
                from: self.canonical_key.clone(),
                to: target.canonical_key.clone(),
            });
        }
        Ok(value * self.base_ratio / target.base_ratio)
    }
}

impl fmt::Display for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key)
    }
}

/// Errors raised by registry construction, lookup and conversion
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("{name} is already a defined unit")]
    Redefinition { name: String },

    #[error("unknown unit: {name}")]
    Undefined { name: String },

    #[error("{to} is not compatible with {from}")]
    Incompatible { from: String, to: String },

    #[error("invalid density unit '{text}', expected <mass>/<volume>")]
    InvalidDensityUnit { text: String },

    #[error("unknown unit group: {0}")]
    UnknownGroup(String),
}

impl UnitError {
    pub fn undefined(name: &str) -> Self {
        UnitError::Undefined { name: name.to_string() }
    }
}

impl From<UnitError> for AgriError {
    fn from(err: UnitError) -> Self {
        match &err {
            UnitError::Redefinition { name } => AgriError::unit_redefined(name),
            UnitError::Undefined { name } => AgriError::undefined_unit(name),
            UnitError::Incompatible { from, to } => AgriError::incompatible_units(from, to),
            UnitError::InvalidDensityUnit { .. } => AgriError::domain_error(err.to_string())
                .with_suggestion("Write density units as mass/volume, e.g. \"lbs/gal\""),
            UnitError::UnknownGroup(_) => AgriError::domain_error(err.to_string())
                .with_suggestion("Groups are liquid, weight, seed, yield and area"),
        }
    }
}
