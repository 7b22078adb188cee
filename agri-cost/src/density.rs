//! Liquid density bridge
//!
//! Liquids are often priced by weight (per ton) but applied by volume (per
//! gallon). A density in mass per volume turns one into the other.

use std::fmt;
use std::str::FromStr;
use agri_units::{parse_unit, Quantity, UnitError, UnitGroup, UnitRegistry};

/// Units of a density figure, e.g. `lbs/gal`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityUnit {
    pub mass_unit: String,
    pub volume_unit: String,
}

impl DensityUnit {
    pub fn new(mass_unit: &str, volume_unit: &str) -> Self {
        DensityUnit {
            mass_unit: parse_unit(mass_unit),
            volume_unit: parse_unit(volume_unit),
        }
    }

    /// Both halves must be registered, mass over weight and volume over liquid
    pub fn validate(&self, units: &UnitRegistry) -> Result<(), UnitError> {
        let mass = units.resolve(self.mass_unit.as_str())?;
        let volume = units.resolve(self.volume_unit.as_str())?;
        if mass.group != UnitGroup::Weight || volume.group != UnitGroup::Liquid {
            return Err(UnitError::InvalidDensityUnit { text: self.to_string() });
        }
        Ok(())
    }
}

impl Default for DensityUnit {
    fn default() -> Self {
        DensityUnit::new("lbs", "gal")
    }
}

impl fmt::Display for DensityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mass_unit, self.volume_unit)
    }
}

impl FromStr for DensityUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UnitError::InvalidDensityUnit { text: s.to_string() };
        let (mass, volume) = s.split_once('/').ok_or_else(invalid)?;
        let (mass, volume) = (mass.trim(), volume.trim());
        if mass.is_empty() || volume.is_empty() || volume.contains('/') {
            return Err(invalid());
        }
        Ok(DensityUnit::new(mass, volume))
    }
}

/// Weight of a liquid amount, expressed in `solid_unit`
///
/// The amount is first expressed in the density's volume unit, multiplied
/// by the density to get mass in the density's mass unit, then converted.
pub fn liquid_to_solid(
    units: &UnitRegistry,
    amount: f64,
    liquid_unit: &str,
    solid_unit: &str,
    density: f64,
    density_unit: &DensityUnit,
) -> Result<Quantity, UnitError> {
    density_unit.validate(units)?;
    let volume = Quantity::new(units, amount, &parse_unit(liquid_unit))?
        .to(units, density_unit.volume_unit.as_str())?;
    let mass = Quantity::new(units, volume.to_number() * density, &density_unit.mass_unit)?;
    mass.to(units, parse_unit(solid_unit).as_str())
}
