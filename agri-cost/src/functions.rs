//! Cost functions for Agri
//!
//! Product and line item arguments are record objects, e.g.
//! `{"units": "per ton", "price": 4000, "density": 10, "liquid": true}` and
//! `{"units": "gallons", "amount": 100}`.

use agri_plugin::prelude::*;
use crate::helper::UnitsHelper;
use crate::records::{LineItemRecord, ProductRecord};

fn product_arg(args: &[Value], index: usize, func: &str) -> Result<ProductRecord, AgriError> {
    extract_object(&args[index], func, "product")?;
    ProductRecord::from_value(&args[index]).map_err(|e| e.in_function(func))
}

fn line_item_arg(args: &[Value], index: usize, func: &str) -> Result<LineItemRecord, AgriError> {
    extract_object(&args[index], func, "line_item")?;
    LineItemRecord::from_value(&args[index]).map_err(|e| e.in_function(func))
}

fn into_value(result: Result<Value, AgriError>) -> Value {
    result.unwrap_or_else(Value::Error)
}

static PRODUCT_ITEM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("product", "Object", "Product record: units, price, density, liquid, multiplier"),
    ArgMeta::required("line_item", "Object", "Line item record: units, amount"),
];

// ============ list_available_units ============

pub struct ListAvailableUnits {
    helper: UnitsHelper,
}

impl ListAvailableUnits {
    pub fn new(helper: UnitsHelper) -> Self {
        ListAvailableUnits { helper }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "list_available_units", 1)?;
        let product = product_arg(args, 0, "list_available_units")?;
        Ok(Value::from(self.helper.list_available_units(&product)))
    }
}

static LIST_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("product", "Object", "Product record; only units and liquid/density are used"),
];

static LIST_EXAMPLES: [&str; 3] = [
    "list_available_units({units: \"custom\"}) → [seeds, bags, units - 130k, units - 140k, custom]",
    "list_available_units({units: \"per bushel\"}) → [bushels]",
    "list_available_units({units: \"per ton\", liquid: true, density: 10}) → [gallons, ...]",
];

impl FunctionPlugin for ListAvailableUnits {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "list_available_units",
            description: "List the units a line item for this product can be recorded in",
            usage: "list_available_units(product)",
            args: &LIST_ARGS,
            returns: "List",
            examples: &LIST_EXAMPLES,
            category: "cost",
            related: &["selectable_units", "per_unit_cost"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args))
    }
}

// ============ per_unit_cost ============

pub struct PerUnitCost {
    helper: UnitsHelper,
}

impl PerUnitCost {
    pub fn new(helper: UnitsHelper) -> Self {
        PerUnitCost { helper }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "per_unit_cost", 2)?;
        let product = product_arg(args, 0, "per_unit_cost")?;
        let item = line_item_arg(args, 1, "per_unit_cost")?;
        Ok(Value::Number(self.helper.per_unit_cost(&item, &product)))
    }
}

static PER_UNIT_EXAMPLES: [&str; 2] = [
    "per_unit_cost({units: \"per ton\", price: 4000}, {units: \"lbs\", amount: 10}) → 2",
    "per_unit_cost({units: \"custom\", multiplier: 1000, price: 4000}, {units: \"custom\", amount: 1}) → 4000",
];

impl FunctionPlugin for PerUnitCost {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "per_unit_cost",
            description: "Cost of one line item unit of the product",
            usage: "per_unit_cost(product, line_item)",
            args: &PRODUCT_ITEM_ARGS,
            returns: "Number",
            examples: &PER_UNIT_EXAMPLES,
            category: "cost",
            related: &["per_acre_cost", "quantity_in_product_units"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args))
    }
}

// ============ quantity_in_product_units ============

pub struct QuantityInProductUnits {
    helper: UnitsHelper,
}

impl QuantityInProductUnits {
    pub fn new(helper: UnitsHelper) -> Self {
        QuantityInProductUnits { helper }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "quantity_in_product_units", 2)?;
        let product = product_arg(args, 0, "quantity_in_product_units")?;
        let item = line_item_arg(args, 1, "quantity_in_product_units")?;
        Ok(Value::Number(self.helper.quantity_in_product_units(&item, &product)))
    }
}

impl FunctionPlugin for QuantityInProductUnits {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "quantity_in_product_units",
            description: "Amount of a line item expressed in the product's pricing unit",
            usage: "quantity_in_product_units(product, line_item)",
            args: &PRODUCT_ITEM_ARGS,
            returns: "Number",
            examples: &["quantity_in_product_units({units: \"per ton\", price: 4000}, {units: \"lbs\", amount: 10}) → 0.005"],
            category: "cost",
            related: &["per_unit_cost", "convert_unit"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args))
    }
}

// ============ per_acre_cost ============

pub struct PerAcreCost {
    helper: UnitsHelper,
}

impl PerAcreCost {
    pub fn new(helper: UnitsHelper) -> Self {
        PerAcreCost { helper }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "per_acre_cost", 3)?;
        let product = product_arg(args, 0, "per_acre_cost")?;
        let item = line_item_arg(args, 1, "per_acre_cost")?;
        let acres = extract_number(&args[2], "per_acre_cost", "field_acres")?;
        if acres <= 0.0 && item.is_total_dose {
            return Err(AgriError::domain_error(format!(
                "per_acre_cost(): field_acres must be positive for a total dose, got {}",
                acres
            )));
        }
        Ok(Value::Number(self.helper.per_acre_cost(&item, &product, acres)))
    }
}

static PER_ACRE_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("product", "Object", "Product record"),
    ArgMeta::required("line_item", "Object", "Line item record: units, amount, applied_acres, applied_acres_units, is_total"),
    ArgMeta::required("field_acres", "Number", "Size of the field in acres"),
];

static PER_ACRE_EXAMPLES: [&str; 2] = [
    "per_acre_cost({units: \"per ton\", price: 4000}, {units: \"lbs\", amount: 20, is_total: true}, 100) → 0.4",
    "per_acre_cost({units: \"custom\", multiplier: 1000, price: 4000}, {units: \"custom\", amount: 1, applied_acres: 100}, 200) → 2000",
];

impl FunctionPlugin for PerAcreCost {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "per_acre_cost",
            description: "Cost per acre of a line item over a field",
            usage: "per_acre_cost(product, line_item, field_acres)",
            args: &PER_ACRE_ARGS,
            returns: "Number",
            examples: &PER_ACRE_EXAMPLES,
            category: "cost",
            related: &["per_unit_cost"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args))
    }
}

// ============ liquid_to_solid ============

pub struct LiquidToSolid {
    helper: UnitsHelper,
}

impl LiquidToSolid {
    pub fn new(helper: UnitsHelper) -> Self {
        LiquidToSolid { helper }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "liquid_to_solid", 4)?;
        let amount = extract_number(&args[0], "liquid_to_solid", "amount")?;
        let liquid_unit = extract_text(&args[1], "liquid_to_solid", "liquid_unit")?;
        let solid_unit = extract_text(&args[2], "liquid_to_solid", "solid_unit")?;
        let density = extract_number(&args[3], "liquid_to_solid", "density")?;
        let density_unit = extract_optional_text(args, 4);

        let mass = self.helper
            .liquid_to_solid(amount, &liquid_unit, &solid_unit, density, density_unit.as_deref())
            .map_err(|e| AgriError::from(e).in_function("liquid_to_solid"))?;
        Ok(Value::Number(mass.to_number()))
    }
}

static LIQUID_TO_SOLID_ARGS: [ArgMeta; 5] = [
    ArgMeta::required("amount", "Number", "Liquid amount"),
    ArgMeta::required("liquid_unit", "Text", "Unit of the amount (e.g., \"gallons\")"),
    ArgMeta::required("solid_unit", "Text", "Weight unit of the result (e.g., \"tons\")"),
    ArgMeta::required("density", "Number", "Mass per volume"),
    ArgMeta::optional("density_unit", "Text", "Units of density as mass/volume", "lbs/gal"),
];

static LIQUID_TO_SOLID_EXAMPLES: [&str; 2] = [
    "liquid_to_solid(8000, \"gallons\", \"tons\", 0.25) → 1",
    "liquid_to_solid(500, \"ml\", \"kg\", 1.2, \"kg/l\") → 0.6",
];

impl FunctionPlugin for LiquidToSolid {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "liquid_to_solid",
            description: "Weight of a liquid amount given its density",
            usage: "liquid_to_solid(amount, liquid_unit, solid_unit, density, [density_unit])",
            args: &LIQUID_TO_SOLID_ARGS,
            returns: "Number",
            examples: &LIQUID_TO_SOLID_EXAMPLES,
            category: "cost",
            related: &["convert_unit", "per_unit_cost"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_units::UnitRegistry;
    use serde_json::json;
    use std::sync::Arc;

    fn helper() -> UnitsHelper {
        UnitsHelper::new(Arc::new(UnitRegistry::standard().unwrap()))
    }

    fn record(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    #[test]
    fn test_per_unit_cost_liquid_product() {
        let f = PerUnitCost::new(helper());
        let result = f.call(&[
            record(json!({"units": "per ton", "price": 4000, "density": 10, "liquid": true})),
            record(json!({"units": "gallons", "amount": 100})),
        ]);
        assert!(approx(result.as_number().unwrap(), 20.0));
    }

    #[test]
    fn test_per_unit_cost_missing_field() {
        let f = PerUnitCost::new(helper());
        let result = f.call(&[
            record(json!({"units": "per ton", "price": 4000})),
            record(json!({"amount": 100})),
        ]);
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::MISSING_FIELD);
        assert_eq!(err.context.as_ref().and_then(|c| c.function.as_deref()), Some("per_unit_cost"));
    }

    #[test]
    fn test_record_args_must_be_objects() {
        let f = PerUnitCost::new(helper());
        let result = f.call(&[Value::from("per ton"), record(json!({"units": "lbs", "amount": 1}))]);
        assert_eq!(result.as_error().unwrap().code, codes::ARG_TYPE);
    }

    #[test]
    fn test_quantity_in_product_units() {
        let f = QuantityInProductUnits::new(helper());
        let result = f.call(&[
            record(json!({"units": "per ton", "price": 4000})),
            record(json!({"units": "lbs", "amount": 10})),
        ]);
        assert!(approx(result.as_number().unwrap(), 0.005));
    }

    #[test]
    fn test_per_acre_cost_percent() {
        let f = PerAcreCost::new(helper());
        let result = f.call(&[
            record(json!({"units": "per lbs", "price": 2})),
            record(json!({"units": "lbs", "amount": 10, "applied_acres": "50", "applied_acres_units": "percent"})),
            Value::Number(80.0),
        ]);
        assert!(approx(result.as_number().unwrap(), 10.0));
    }

    #[test]
    fn test_per_acre_cost_total_dose_needs_acres() {
        let f = PerAcreCost::new(helper());
        let result = f.call(&[
            record(json!({"units": "per ton", "price": 4000})),
            record(json!({"units": "lbs", "amount": 20, "is_total": true})),
            Value::Number(0.0),
        ]);
        assert_eq!(result.as_error().unwrap().code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_list_available_units() {
        let f = ListAvailableUnits::new(helper());
        let result = f.call(&[record(json!({"units": "custom"}))]);
        assert_eq!(result.to_string(), "[seeds, bags, units - 130k, units - 140k, custom]");
    }

    #[test]
    fn test_liquid_to_solid() {
        let f = LiquidToSolid::new(helper());
        let args = [
            Value::Number(8000.0),
            Value::Text("gallons".to_string()),
            Value::Text("tons".to_string()),
            Value::Number(0.25),
        ];
        assert!(approx(f.call(&args).as_number().unwrap(), 1.0));

        let bad = [
            Value::Number(1.0),
            Value::Text("gallons".to_string()),
            Value::Text("tons".to_string()),
            Value::Number(0.25),
            Value::Text("lbs-per-gal".to_string()),
        ];
        let err = f.call(&bad);
        assert_eq!(err.as_error().unwrap().code, codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_liquid_to_solid_incompatible() {
        let f = LiquidToSolid::new(helper());
        let args = [
            Value::Number(1.0),
            Value::Text("lbs".to_string()),
            Value::Text("tons".to_string()),
            Value::Number(10.0),
        ];
        assert_eq!(f.call(&args).as_error().unwrap().code, codes::INCOMPATIBLE_UNITS);
    }
}
