//! Quantity type - a value with a canonical unit

use std::fmt;
use serde::Serialize;
use crate::{UnitError, UnitRef, UnitRegistry};

/// An amount of something, in a registered unit
///
/// Quantities are immutable. `unit` is always the canonical key of the unit
/// it was created with, so `Quantity::new(.., "gallons")` reports `"gal"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    value: f64,
    unit: String,
}

impl Quantity {
    /// Create a quantity, resolving `unit` through the registry
    pub fn new(units: &UnitRegistry, value: f64, unit: &str) -> Result<Self, UnitError> {
        let descriptor = units.resolve(unit)?;
        Ok(Quantity {
            value,
            unit: descriptor.canonical_key.clone(),
        })
    }

    pub fn to_number(&self) -> f64 {
        self.value
    }

    /// Canonical key of the unit
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Check if this quantity can be expressed in `other`'s unit
    pub fn is_compatible<'a>(&self, units: &UnitRegistry, other: impl Into<UnitRef<'a>>) -> Result<bool, UnitError> {
        units.are_compatible(self, other)
    }

    /// Convert to another unit of the same group
    pub fn to<'a>(&self, units: &UnitRegistry, target: impl Into<UnitRef<'a>>) -> Result<Quantity, UnitError> {
        let from = units.resolve(self)?;
        let to = units.resolve(target)?;
        let value = from.convert_value(self.value, to)?;
        Ok(Quantity {
            value,
            unit: to.canonical_key.clone(),
        })
    }

    /// Same unit, scaled value
    pub fn scale(&self, factor: f64) -> Quantity {
        Quantity {
            value: self.value * factor,
            unit: self.unit.clone(),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units() -> UnitRegistry {
        UnitRegistry::standard().unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_creation_canonicalizes_unit() {
        let units = units();
        let q = Quantity::new(&units, 2.5, "gallons").unwrap();
        assert_eq!(q.to_number(), 2.5);
        assert_eq!(q.unit(), "gal");
        assert_eq!(q.to_string(), "2.5 gal");
    }

    #[test]
    fn test_unknown_unit() {
        let err = Quantity::new(&units(), 1.0, "hogshead").unwrap_err();
        assert_eq!(err, UnitError::undefined("hogshead"));
    }

    #[test]
    fn test_convert() {
        let units = units();
        let lbs = Quantity::new(&units, 2000.0, "lbs").unwrap();
        let tons = lbs.to(&units, "tons").unwrap();
        assert!(approx(tons.to_number(), 1.0));
        assert_eq!(tons.unit(), "ton");

        let bags = Quantity::new(&units, 160_000.0, "seeds").unwrap().to(&units, "bags").unwrap();
        assert!(approx(bags.to_number(), 2.0));
    }

    #[test]
    fn test_convert_is_immutable() {
        let units = units();
        let gal = Quantity::new(&units, 1.0, "gal").unwrap();
        let _ = gal.to(&units, "quarts").unwrap();
        assert_eq!(gal.to_number(), 1.0);
        assert_eq!(gal.unit(), "gal");
    }

    #[test]
    fn test_round_trip() {
        let units = units();
        let pairs = [("gal", "ml"), ("oz", "t"), ("bag", "units - 130k"), ("ha", "acres")];
        for (a, b) in pairs {
            let q = Quantity::new(&units, 37.25, a).unwrap();
            let back = q.to(&units, b).unwrap().to(&units, a).unwrap();
            assert!(approx(back.to_number(), 37.25), "{} -> {} -> {}", a, b, a);
        }
    }

    #[test]
    fn test_incompatible_groups() {
        let units = units();
        let lbs = Quantity::new(&units, 1.0, "lbs").unwrap();
        let err = lbs.to(&units, "gallons").unwrap_err();
        assert_eq!(err, UnitError::Incompatible { from: "lbs".to_string(), to: "gal".to_string() });
        assert!(!lbs.is_compatible(&units, "gallons").unwrap());
        assert!(lbs.is_compatible(&units, "kilograms").unwrap());
    }

    #[test]
    fn test_compatible_with_quantity() {
        let units = units();
        let a = Quantity::new(&units, 1.0, "acres").unwrap();
        let b = Quantity::new(&units, 1.0, "hectare").unwrap();
        assert!(a.is_compatible(&units, &b).unwrap());
    }

    #[test]
    fn test_scale() {
        let units = units();
        let q = Quantity::new(&units, 4.0, "bushels").unwrap().scale(2.5);
        assert_eq!(q.to_number(), 10.0);
        assert_eq!(q.unit(), "bu");
    }

    #[test]
    fn test_serialize() {
        let q = Quantity::new(&units(), 3.0, "kg").unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json, serde_json::json!({"value": 3.0, "unit": "kg"}));
    }
}
