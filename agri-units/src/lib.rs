//! Agri Units - Agricultural unit registry and conversion
//!
//! Units are grouped by what they measure. Conversion is linear and only
//! allowed within a group:
//! - Liquid (gal, l, ml, pt, qt, floz)
//! - Weight (lbs, oz, ton, g, mg, kg, t)
//! - Seed (seed, bag, units - 130k, units - 140k)
//! - Yield (bu)
//! - Area (ac, ha)
//!
//! There is no global registry. Build a `UnitRegistry` once and share it
//! behind an `Arc`.

mod group;
mod unit;
mod quantity;
mod registry;
mod convert;
pub mod definitions;
pub mod parse;

pub use group::UnitGroup;
pub use unit::{UnitDescriptor, UnitError};
pub use quantity::Quantity;
pub use registry::{RegistryBuilder, UnitRef, UnitRegistry};
pub use definitions::{DefinitionTable, UnitDefinition};
pub use convert::{convert_to_unit, is_compatible_unit};
pub use parse::{normalize_legacy_unit, normalize_unit, parse_unit, is_custom_unit};

use std::sync::Arc;
use agri_plugin::PluginRegistry;

/// Load unit functions into registry
pub fn load_units_library(registry: PluginRegistry, units: Arc<UnitRegistry>) -> PluginRegistry {
    registry
        // Conversion
        .with_function(convert::ConvertUnit::new(units.clone()))
        .with_function(convert::CompatibleUnits::new(units.clone()))

        // Inspection
        .with_function(convert::SelectableUnits::new(units.clone()))
        .with_function(convert::NormalizeUnit)
        .with_function(convert::QuantityFn::new(units))
}
