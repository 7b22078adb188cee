//! Agri - Agricultural unit conversion and input costs
//!
//! `Agri` bundles a unit registry with every unit and cost function:
//!
//! ```no_run
//! use agri::Agri;
//! use serde_json::json;
//!
//! let agri = Agri::new().unwrap();
//! let cost = agri.call_json("per_unit_cost", vec![
//!     json!({"units": "per ton", "price": 4000}),
//!     json!({"units": "lbs", "amount": 10}),
//! ]);
//! assert!((cost.as_f64().unwrap() - 2.0).abs() < 1e-6);
//! ```

mod config;

pub use config::{EngineConfig, EngineError, UNIT_TABLES_ENV};
pub use agri_core::{AgriError, Value};
pub use agri_cost::{LineItemRecord, ProductRecord, UnitsHelper};
pub use agri_units::{Quantity, UnitGroup, UnitRegistry};

use agri_plugin::PluginRegistry;
use std::sync::Arc;
use tracing::debug;

/// Load every unit and cost function into registry
pub fn load_agri_library(registry: PluginRegistry, units: Arc<UnitRegistry>) -> PluginRegistry {
    let registry = agri_units::load_units_library(registry, units.clone());
    agri_cost::load_cost_library(registry, UnitsHelper::new(units))
}

/// Create registry with every function bound to `units`
pub fn standard_registry(units: Arc<UnitRegistry>) -> PluginRegistry {
    load_agri_library(PluginRegistry::new(), units)
}

/// Main Agri engine
pub struct Agri {
    registry: Arc<PluginRegistry>,
    units: Arc<UnitRegistry>,
}

impl Agri {
    /// Engine over the built-in unit tables
    pub fn new() -> Result<Self, EngineError> {
        Ok(Self::with_units(Arc::new(UnitRegistry::standard()?)))
    }

    /// Engine over the built-in tables plus those named by `AGRI_UNIT_TABLES`
    pub fn from_env() -> Result<Self, EngineError> {
        Self::with_config(&EngineConfig::from_env()?)
    }

    pub fn with_config(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::with_units(Arc::new(config.build_units()?)))
    }

    pub fn with_units(units: Arc<UnitRegistry>) -> Self {
        Self {
            registry: Arc::new(standard_registry(units.clone())),
            units,
        }
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Value {
        let result = self.registry.call_function(name, args);
        if let Value::Error(err) = &result {
            debug!(function = name, code = %err.code, "call failed");
        }
        result
    }

    /// `call` over plain JSON arguments and result
    pub fn call_json(&self, name: &str, args: Vec<serde_json::Value>) -> serde_json::Value {
        let args: Vec<Value> = args.into_iter().map(Value::from).collect();
        self.call(name, &args).to_json()
    }

    pub fn help(&self, name: Option<&str>) -> Value {
        self.registry.help(name)
    }

    pub fn list_functions(&self, category: Option<&str>) -> Value {
        self.registry.list_functions(category)
    }

    pub fn units(&self) -> &Arc<UnitRegistry> {
        &self.units
    }

    /// Typed access to the cost calculations
    pub fn helper(&self) -> UnitsHelper {
        UnitsHelper::new(self.units.clone())
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_core::codes;
    use serde_json::json;

    fn agri() -> Agri {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
        Agri::new().unwrap()
    }

    fn number(v: serde_json::Value) -> f64 {
        v.as_f64().unwrap_or_else(|| panic!("expected a number, got {}", v))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_function_surface() {
        let names = agri().registry().function_names().join(",");
        assert_eq!(names, "compatible_units,convert_unit,liquid_to_solid,list_available_units,\
            normalize_unit,per_acre_cost,per_unit_cost,quantity,quantity_in_product_units,selectable_units");
    }

    #[test]
    fn test_liquid_to_solid() {
        let agri = agri();
        let tons = agri.call_json("liquid_to_solid", vec![json!(8000), json!("gallons"), json!("tons"), json!(0.25)]);
        assert!(approx(number(tons), 1.0));
        let tons = agri.call_json("liquid_to_solid",
            vec![json!(8000), json!("gallons"), json!("tons"), json!(0.25), json!("lbs/gal")]);
        assert!(approx(number(tons), 1.0));
    }

    #[test]
    fn test_liquid_product_priced_by_weight() {
        let agri = agri();
        let product = json!({"units": "per ton", "density": 10, "liquid": true, "price": 4000});
        let item = json!({"units": "gallons", "amount": 100});

        let cost = agri.call_json("per_unit_cost", vec![product.clone(), item.clone()]);
        assert!(approx(number(cost), 20.0));
        let qty = agri.call_json("quantity_in_product_units", vec![product.clone(), item.clone()]);
        assert!(approx(number(qty), 0.5));
        let per_acre = agri.call_json("per_acre_cost", vec![product, item, json!(100)]);
        assert!(approx(number(per_acre), 2000.0));
    }

    #[test]
    fn test_custom_product() {
        let agri = agri();
        let product = json!({"units": "custom", "multiplier": 1000, "price": 4000});

        let cost = agri.call_json("per_unit_cost", vec![product.clone(), json!({"units": "custom", "amount": 1})]);
        assert!(approx(number(cost), 4000.0));

        let item = json!({"units": "custom", "amount": 1, "applied_acres": 100});
        let per_acre = agri.call_json("per_acre_cost", vec![product.clone(), item, json!(200)]);
        assert!(approx(number(per_acre), 2000.0));

        let qty = agri.call_json("quantity_in_product_units", vec![product, json!({"units": "seeds", "amount": 300})]);
        assert!(approx(number(qty), 0.3));
    }

    #[test]
    fn test_unconvertible_counts_one_to_one() {
        let agri = agri();
        let product = json!({"units": "per ton", "price": 4000});

        for units in ["seeds", "gallons"] {
            let item = json!({"units": units, "amount": 300});
            let cost = agri.call_json("per_unit_cost", vec![product.clone(), item.clone()]);
            assert!(approx(number(cost), 4000.0));
            let qty = agri.call_json("quantity_in_product_units", vec![product.clone(), item]);
            assert!(approx(number(qty), 300.0));
        }
    }

    #[test]
    fn test_total_dose() {
        let agri = agri();
        let product = json!({"units": "per ton", "price": 4000});
        let item = json!({"units": "lbs", "amount": 20, "is_total": true});
        let at_100 = agri.call_json("per_acre_cost", vec![product.clone(), item.clone(), json!(100)]);
        let at_200 = agri.call_json("per_acre_cost", vec![product, item, json!(200)]);
        assert!(approx(number(at_100), 0.4));
        assert!(approx(number(at_200), 0.2));
    }

    #[test]
    fn test_list_available_units() {
        let agri = agri();
        let units = agri.call_json("list_available_units", vec![json!({"units": "custom"})]);
        assert_eq!(units, json!(["seeds", "bags", "units - 130k", "units - 140k", "custom"]));

        let units = agri.call_json("list_available_units", vec![json!({"units": "per ton", "density": 10})]);
        assert_eq!(units[0], "gallons");
        let units = agri.call_json("list_available_units",
            vec![json!({"units": "per ton", "density": 10, "liquid": false})]);
        assert_eq!(units[0], "lbs");
    }

    #[test]
    fn test_stored_text_amount() {
        let agri = agri();
        let cost = agri.call_json("per_unit_cost",
            vec![json!({"units": "per ton", "price": "4000"}), json!({"units": "lbs", "amount": "10"})]);
        assert!(approx(number(cost), 2.0));
        let qty = agri.call_json("quantity_in_product_units",
            vec![json!({"units": "per ton"}), json!({"units": "lbs", "amount": "10"})]);
        assert!(approx(number(qty), 0.005));
    }

    #[test]
    fn test_convert_errors_surface() {
        let agri = agri();
        let result = agri.call("convert_unit", &[Value::from(1.0), Value::from("lbs"), Value::from("gallons")]);
        assert_eq!(result.as_error().unwrap().code, codes::INCOMPATIBLE_UNITS);

        let json = agri.call_json("convert_unit", vec![json!(1), json!("lbs"), json!("gallons")]);
        assert_eq!(json["error"]["code"], "INCOMPATIBLE_UNITS");
    }

    #[test]
    fn test_unknown_function() {
        let result = agri().call("per_hectare_cost", &[]);
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::UNDEFINED_FUNC);
        assert!(err.suggestion.as_deref().unwrap_or("").contains("per_acre_cost"));
    }

    #[test]
    fn test_help_and_listing() {
        let agri = agri();
        let help = agri.help(Some("per_acre_cost"));
        assert_eq!(help.get("usage").as_text(), Some("per_acre_cost(product, line_item, field_acres)"));

        assert_eq!(agri.list_functions(Some("cost")).as_list().map(|l| l.len()), Some(5));
        assert_eq!(agri.list_functions(Some("units")).as_list().map(|l| l.len()), Some(5));
    }

    #[test]
    fn test_typed_helper_shares_registry() {
        let agri = agri();
        let helper = agri.helper();
        let product = ProductRecord::new("per ton", 4000.0);
        let item = LineItemRecord::new("lbs", 10.0);
        assert!(approx(helper.per_unit_cost(&item, &product), 2.0));
        assert!(std::ptr::eq(helper.units(), agri.units().as_ref()));
    }

    #[test]
    fn test_with_config() {
        let config = EngineConfig::from_json(r#"{"tables": [{"group": "seed", "units": [
            {"key": "box", "name": "box", "value": 50000, "aliases": ["boxes"], "selectable_as": "boxes"}
        ]}]}"#).unwrap();
        let agri = Agri::with_config(&config).unwrap();
        let qty = agri.call_json("quantity_in_product_units",
            vec![json!({"units": "per bag", "price": 300}), json!({"units": "boxes", "amount": 8})]);
        assert!(approx(number(qty), 5.0));
    }
}
