//! Unit conversion functions for Agri

use std::sync::Arc;
use agri_plugin::prelude::*;
use crate::{Quantity, UnitError, UnitGroup, UnitRegistry};
use crate::parse::parse_unit;

/// Convert `amount` between two free-form unit strings
///
/// Both units are normalized first, so `"per ton"` and `"litres"` work.
/// Unlike the cost calculations, failures are returned to the caller.
pub fn convert_to_unit(units: &UnitRegistry, amount: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    let quantity = Quantity::new(units, amount, &parse_unit(from))?;
    Ok(quantity.to(units, parse_unit(to).as_str())?.to_number())
}

/// Whether two free-form unit strings belong to the same group
pub fn is_compatible_unit(units: &UnitRegistry, a: &str, b: &str) -> Result<bool, UnitError> {
    units.are_compatible(parse_unit(a).as_str(), parse_unit(b).as_str())
}

fn into_value(result: Result<Value, AgriError>, func: &str) -> Value {
    match result {
        Ok(v) => v,
        Err(e) => Value::Error(e.in_function(func)),
    }
}

// ============ convert_unit ============

pub struct ConvertUnit {
    units: Arc<UnitRegistry>,
}

impl ConvertUnit {
    pub fn new(units: Arc<UnitRegistry>) -> Self {
        ConvertUnit { units }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "convert_unit", 3)?;
        let amount = extract_number(&args[0], "convert_unit", "amount")?;
        let from = extract_text(&args[1], "convert_unit", "from_unit")?;
        let to = extract_text(&args[2], "convert_unit", "to_unit")?;
        Ok(Value::Number(convert_to_unit(&self.units, amount, &from, &to)?))
    }
}

static CONVERT_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("amount", "Number", "Amount to convert"),
    ArgMeta::required("from_unit", "Text", "Source unit (e.g., \"gallons\", \"per ton\")"),
    ArgMeta::required("to_unit", "Text", "Target unit (e.g., \"liters\")"),
];

static CONVERT_EXAMPLES: [&str; 3] = [
    "convert_unit(1, \"gallons\", \"quarts\") → 4",
    "convert_unit(2000, \"lbs\", \"per ton\") → 1",
    "convert_unit(1, \"bag\", \"seeds\") → 80000",
];

static CONVERT_RELATED: [&str; 3] = ["compatible_units", "normalize_unit", "liquid_to_solid"];

impl FunctionPlugin for ConvertUnit {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert_unit",
            description: "Convert an amount from one unit to another in the same group",
            usage: "convert_unit(amount, from_unit, to_unit)",
            args: &CONVERT_ARGS,
            returns: "Number",
            examples: &CONVERT_EXAMPLES,
            category: "units",
            related: &CONVERT_RELATED,
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args), "convert_unit")
    }
}

// ============ compatible_units ============

pub struct CompatibleUnits {
    units: Arc<UnitRegistry>,
}

impl CompatibleUnits {
    pub fn new(units: Arc<UnitRegistry>) -> Self {
        CompatibleUnits { units }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "compatible_units", 2)?;
        let a = extract_text(&args[0], "compatible_units", "unit_a")?;
        let b = extract_text(&args[1], "compatible_units", "unit_b")?;
        Ok(Value::Bool(is_compatible_unit(&self.units, &a, &b)?))
    }
}

static COMPATIBLE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("unit_a", "Text", "First unit"),
    ArgMeta::required("unit_b", "Text", "Second unit"),
];

static COMPATIBLE_EXAMPLES: [&str; 2] = [
    "compatible_units(\"gallons\", \"liters\") → true",
    "compatible_units(\"gallons\", \"per ton\") → false",
];

impl FunctionPlugin for CompatibleUnits {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "compatible_units",
            description: "Check whether two units can be converted into each other",
            usage: "compatible_units(unit_a, unit_b)",
            args: &COMPATIBLE_ARGS,
            returns: "Bool",
            examples: &COMPATIBLE_EXAMPLES,
            category: "units",
            related: &["convert_unit", "selectable_units"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args), "compatible_units")
    }
}

// ============ selectable_units ============

pub struct SelectableUnits {
    units: Arc<UnitRegistry>,
}

impl SelectableUnits {
    pub fn new(units: Arc<UnitRegistry>) -> Self {
        SelectableUnits { units }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "selectable_units", 1)?;
        let name = extract_text(&args[0], "selectable_units", "group")?;
        let group = match name.parse::<UnitGroup>() {
            Ok(group) => group,
            Err(_) => self.units.resolve(parse_unit(&name).as_str())?.group,
        };
        Ok(Value::from(self.units.selectable_units(group).to_vec()))
    }
}

static SELECTABLE_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("group", "Text", "Group name (liquid, weight, seed, yield, area) or any unit of the group"),
];

static SELECTABLE_EXAMPLES: [&str; 2] = [
    "selectable_units(\"yield\") → [bushels]",
    "selectable_units(\"per acre\") → [acres, hectare]",
];

impl FunctionPlugin for SelectableUnits {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "selectable_units",
            description: "List the display units of a group, default first",
            usage: "selectable_units(group)",
            args: &SELECTABLE_ARGS,
            returns: "List",
            examples: &SELECTABLE_EXAMPLES,
            category: "units",
            related: &["list_available_units", "compatible_units"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args), "selectable_units")
    }
}

// ============ normalize_unit ============

pub struct NormalizeUnit;

static NORMALIZE_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("unit", "Text", "Unit as written in a record"),
];

static NORMALIZE_EXAMPLES: [&str; 3] = [
    "normalize_unit(\"per ton\") → ton",
    "normalize_unit(\"units - 140k\") → units140k",
    "normalize_unit(\"litres\") → liters",
];

impl FunctionPlugin for NormalizeUnit {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "normalize_unit",
            description: "Normalize a free-form or legacy unit spelling",
            usage: "normalize_unit(unit)",
            args: &NORMALIZE_ARGS,
            returns: "Text",
            examples: &NORMALIZE_EXAMPLES,
            category: "units",
            related: &["convert_unit"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        let unit = require_args(args, "normalize_unit", 1)
            .and_then(|_| extract_text(&args[0], "normalize_unit", "unit"));
        match unit {
            Ok(unit) => Value::Text(parse_unit(&unit)),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ quantity ============

pub struct QuantityFn {
    units: Arc<UnitRegistry>,
}

impl QuantityFn {
    pub fn new(units: Arc<UnitRegistry>) -> Self {
        QuantityFn { units }
    }

    fn eval(&self, args: &[Value]) -> Result<Value, AgriError> {
        require_args(args, "quantity", 2)?;
        let value = extract_number(&args[0], "quantity", "value")?;
        let unit = extract_text(&args[1], "quantity", "unit")?;
        let quantity = Quantity::new(&self.units, value, &parse_unit(&unit))?;
        Ok(Value::Text(quantity.to_string()))
    }
}

static QUANTITY_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("value", "Number", "Numeric value"),
    ArgMeta::required("unit", "Text", "Unit in any registered spelling"),
];

impl FunctionPlugin for QuantityFn {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "quantity",
            description: "Create a quantity and show it in its canonical unit",
            usage: "quantity(value, unit)",
            args: &QUANTITY_ARGS,
            returns: "Text",
            examples: &["quantity(3, \"gallons\") → 3 gal", "quantity(1, \"metric tons\") → 1 t"],
            category: "units",
            related: &["convert_unit", "normalize_unit"],
        }
    }

    fn call(&self, args: &[Value]) -> Value {
        into_value(self.eval(args), "quantity")
    }
}
