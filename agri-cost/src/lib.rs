//! Agri Cost - Product cost normalization
//!
//! Reconciles the unit a line item was recorded in with the unit its product
//! is priced in:
//! - Direct conversion within a unit group (lbs → tons)
//! - Liquid density bridge (gallons of a liquid priced per ton)
//! - Custom seed-count units (`"custom"` priced per N seeds)
//!
//! When no conversion exists, one line item unit counts as one pricing unit.
//! For plain unit conversions use agri-units.

mod records;
mod density;
mod helper;
mod functions;

pub use records::{AppliedAcresMode, LineItemRecord, ProductRecord};
pub use density::{liquid_to_solid, DensityUnit};
pub use helper::{ConversionFailure, UnitsHelper, CUSTOM_UNIT};

use agri_plugin::PluginRegistry;

/// Load cost functions into registry
pub fn load_cost_library(registry: PluginRegistry, helper: UnitsHelper) -> PluginRegistry {
    registry
        // Unit selection
        .with_function(functions::ListAvailableUnits::new(helper.clone()))

        // Cost and quantity
        .with_function(functions::PerUnitCost::new(helper.clone()))
        .with_function(functions::QuantityInProductUnits::new(helper.clone()))
        .with_function(functions::PerAcreCost::new(helper.clone()))

        // Density
        .with_function(functions::LiquidToSolid::new(helper))
}
