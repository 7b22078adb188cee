//! Cost and quantity normalization
//!
//! A line item records how much of a product was applied, in whatever unit
//! the applicator used. The product is priced in its own unit. `UnitsHelper`
//! works out how many pricing units one line item unit is worth, and from
//! that the cost per unit, the quantity in product units, and the cost per
//! acre.
//!
//! The cost calculations never fail. When a line item unit cannot be
//! expressed in the pricing unit, one line item unit is counted as one
//! pricing unit. The plain conversions (`convert_to_unit` and friends) do
//! return their errors.

use std::sync::Arc;
use tracing::debug;
use agri_units::{parse_unit, Quantity, UnitError, UnitGroup, UnitRegistry};
use crate::density::{self, DensityUnit};
use crate::records::{LineItemRecord, ProductRecord};

/// Pricing unit sentinel for products sold per custom seed count
pub const CUSTOM_UNIT: &str = "custom";

/// Why a line item could not be expressed in product units
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionFailure {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("conversion produced a non-positive result: {value}")]
    NonPositive { value: f64 },
}

#[derive(Debug, Clone)]
pub struct UnitsHelper {
    units: Arc<UnitRegistry>,
}

impl UnitsHelper {
    pub fn new(units: Arc<UnitRegistry>) -> Self {
        UnitsHelper { units }
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    /// Density for the volume to weight bridge. Only explicitly flagged liquids get one.
    fn liquid_density(product: &ProductRecord) -> Option<f64> {
        product.density.filter(|&d| product.is_liquid == Some(true) && d > 0.0)
    }

    /// A product with a positive density is liquid unless flagged otherwise
    pub fn is_liquid(&self, product: &ProductRecord) -> bool {
        product.is_liquid != Some(false) && product.density.map_or(false, |d| d > 0.0)
    }

    /// Whether `unit` measures liquid volume
    pub fn is_liquid_unit(&self, unit: &str) -> Result<bool, UnitError> {
        self.is_compatible_unit(unit, "gallons")
    }

    pub fn is_compatible_unit(&self, a: &str, b: &str) -> Result<bool, UnitError> {
        agri_units::is_compatible_unit(&self.units, a, b)
    }

    pub fn convert_to_unit(&self, amount: f64, from: &str, to: &str) -> Result<f64, UnitError> {
        agri_units::convert_to_unit(&self.units, amount, from, to)
    }

    pub fn convert_to_gallons(&self, amount: f64, unit: &str) -> Result<f64, UnitError> {
        self.convert_to_unit(amount, unit, "gallons")
    }

    pub fn convert_to_pounds(&self, amount: f64, unit: &str) -> Result<f64, UnitError> {
        self.convert_to_unit(amount, unit, "lbs")
    }

    /// Weight of a liquid amount; `density_unit` defaults to `lbs/gal`
    pub fn liquid_to_solid(
        &self,
        amount: f64,
        liquid_unit: &str,
        solid_unit: &str,
        density: f64,
        density_unit: Option<&str>,
    ) -> Result<Quantity, UnitError> {
        let density_unit = match density_unit {
            Some(text) => text.parse::<DensityUnit>()?,
            None => DensityUnit::default(),
        };
        density::liquid_to_solid(&self.units, amount, liquid_unit, solid_unit, density, &density_unit)
    }

    /// Pricing units in one line item unit, or why there is no answer
    pub fn try_units_per_line_item(
        &self,
        item: &LineItemRecord,
        product: &ProductRecord,
    ) -> Result<f64, ConversionFailure> {
        let units = self.units();
        let product_unit = parse_unit(&product.pricing_unit);
        let item_unit = parse_unit(&item.recorded_unit);

        let direct = || -> Result<f64, UnitError> {
            Ok(Quantity::new(units, 1.0, &item_unit)?
                .to(units, product_unit.as_str())?
                .to_number())
        };

        let value = if product_unit == CUSTOM_UNIT {
            let multiplier = product.custom_multiplier;
            let applied = if item_unit == CUSTOM_UNIT {
                Quantity::new(units, multiplier, "seed")?
            } else {
                Quantity::new(units, 1.0, &item_unit)?
            };
            applied.to(units, "seed")?.to_number() / multiplier
        } else if let Some(density) = Self::liquid_density(product) {
            if units.are_compatible(item_unit.as_str(), product_unit.as_str())? {
                direct()?
            } else {
                self.liquid_to_solid(1.0, &item_unit, &product_unit, density, product.density_unit.as_deref())?
                    .to_number()
            }
        } else {
            direct()?
        };

        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ConversionFailure::NonPositive { value })
        }
    }

    /// Pricing units in one line item unit, falling back to 1
    pub fn units_per_line_item_in_product_units(&self, item: &LineItemRecord, product: &ProductRecord) -> f64 {
        match self.try_units_per_line_item(item, product) {
            Ok(value) => value,
            Err(failure) => {
                debug!(
                    item_unit = %item.recorded_unit,
                    product_unit = %product.pricing_unit,
                    %failure,
                    "line item unit not convertible, counting one per product unit"
                );
                1.0
            }
        }
    }

    /// Price of one line item unit
    pub fn per_unit_cost(&self, item: &LineItemRecord, product: &ProductRecord) -> f64 {
        self.units_per_line_item_in_product_units(item, product) * product.price
    }

    /// Applied amount expressed in the product's pricing unit
    pub fn quantity_in_product_units(&self, item: &LineItemRecord, product: &ProductRecord) -> f64 {
        self.units_per_line_item_in_product_units(item, product) * item.amount
    }

    /// Cost per acre of a field of `field_acres`
    ///
    /// A total dose is spread over the whole field. Otherwise the amount is
    /// per acre, scaled by the share of the field it was applied to.
    pub fn per_acre_cost(&self, item: &LineItemRecord, product: &ProductRecord, field_acres: f64) -> f64 {
        let per_unit = self.per_unit_cost(item, product);
        if item.is_total_dose {
            return item.amount * per_unit / field_acres;
        }
        item.amount * per_unit * Self::acres_ratio(item, field_acres)
    }

    fn acres_ratio(item: &LineItemRecord, field_acres: f64) -> f64 {
        match item.applied_acres.filter(|a| a.is_finite()) {
            Some(applied) if item.is_percent() && applied != 100.0 => applied / 100.0,
            Some(applied) if !item.is_percent() && applied != field_acres => applied / field_acres,
            _ => 1.0,
        }
    }

    /// Display units a line item for this product may be recorded in
    pub fn list_available_units(&self, product: &ProductRecord) -> Vec<String> {
        let unit = parse_unit(&product.pricing_unit);
        let selectable = |group| self.units.selectable_units(group).to_vec();

        if unit == CUSTOM_UNIT {
            let mut list = selectable(UnitGroup::Seed);
            list.push(CUSTOM_UNIT.to_string());
            list
        } else if self.unit_in_group(&unit, "bushel") {
            selectable(UnitGroup::Yield)
        } else if self.unit_in_group(&unit, "seed") {
            selectable(UnitGroup::Seed)
        } else if self.unit_in_group(&unit, "gallons") || self.is_liquid(product) {
            selectable(UnitGroup::Liquid)
        } else {
            selectable(UnitGroup::Weight)
        }
    }

    fn unit_in_group(&self, unit: &str, sample: &str) -> bool {
        match self.units.are_compatible(unit, sample) {
            Ok(compatible) => compatible,
            Err(err) => {
                debug!(unit, %err, "unknown pricing unit");
                false
            }
        }
    }
}
