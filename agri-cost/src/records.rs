//! Product and line item records
//!
//! Records arrive as JSON objects written by other systems, so field names
//! follow the stored form (`units`, `liquid`, `applied_acres_units`, ...) as
//! serde aliases of the Rust names. Numeric fields that older records stored
//! as text (`"applied_acres": "50"`) are accepted too, as are flags stored as
//! `"true"` or `1`.

use agri_core::{codes, AgriError, Value};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// How `applied_acres` on a line item is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedAcresMode {
    /// Acres actually covered
    Absolute,
    /// Percentage of the field covered
    Percent,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<NumberOrText>::deserialize(de)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(lenient_number(de)?.unwrap_or(0.0))
}

/// Number or numeric text; anything else is rejected
fn text_number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    match NumberOrText::deserialize(de)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse()
            .map_err(|_| D::Error::custom(format!("'{}' is not a number", s))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Truthy flag; unrecognized text counts as unset
fn lenient_flag<'de, D: Deserializer<'de>>(de: D) -> Result<Option<bool>, D::Error> {
    Ok(Option::<Flag>::deserialize(de)?.and_then(|flag| match flag {
        Flag::Bool(b) => Some(b),
        Flag::Number(n) => Some(n != 0.0),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" | "" => Some(false),
            _ => None,
        },
    }))
}

fn lenient_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    Ok(lenient_flag(de)?.unwrap_or(false))
}

fn acres_mode<'de, D: Deserializer<'de>>(de: D) -> Result<Option<AppliedAcresMode>, D::Error> {
    Ok(Option::<String>::deserialize(de)?.map(|mode| {
        if mode.trim().eq_ignore_ascii_case("percent") {
            AppliedAcresMode::Percent
        } else {
            AppliedAcresMode::Absolute
        }
    }))
}

/// A purchasable product and the unit it is priced in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Unit the price refers to, e.g. `"per ton"` or `"custom"`
    #[serde(alias = "units")]
    pub pricing_unit: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    /// Mass per volume, for liquids sold by weight
    #[serde(default, deserialize_with = "lenient_number")]
    pub density: Option<f64>,
    /// Units of `density` as `"<mass>/<volume>"`; `lbs/gal` when absent
    #[serde(default, alias = "density_units")]
    pub density_unit: Option<String>,
    /// Unset is not the same as `false`: see `UnitsHelper::is_liquid`
    #[serde(default, alias = "liquid", deserialize_with = "lenient_flag")]
    pub is_liquid: Option<bool>,
    /// Seeds per custom unit
    #[serde(default, alias = "multiplier", deserialize_with = "lenient_f64")]
    pub custom_multiplier: f64,
}

impl ProductRecord {
    pub fn new(pricing_unit: &str, price: f64) -> Self {
        ProductRecord {
            pricing_unit: pricing_unit.to_string(),
            price,
            density: None,
            density_unit: None,
            is_liquid: None,
            custom_multiplier: 0.0,
        }
    }

    /// Mark as a liquid with the given density in `lbs/gal`
    pub fn liquid(mut self, density: f64) -> Self {
        self.is_liquid = Some(true);
        self.density = Some(density);
        self
    }

    pub fn density_unit(mut self, density_unit: &str) -> Self {
        self.density_unit = Some(density_unit.to_string());
        self
    }

    /// Priced per custom unit of `multiplier` seeds
    pub fn custom(multiplier: f64, price: f64) -> Self {
        ProductRecord {
            custom_multiplier: multiplier,
            ..ProductRecord::new("custom", price)
        }
    }

    /// Parse from a record object. Only `units` is required.
    pub fn from_value(value: &Value) -> Result<Self, AgriError> {
        require_fields(value, "product", &[&["pricing_unit", "units"]])?;
        decode(value, "product")
    }
}

/// One application of a product on a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    #[serde(alias = "units")]
    pub recorded_unit: String,
    #[serde(deserialize_with = "text_number")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub applied_acres: Option<f64>,
    #[serde(default, alias = "applied_acres_units", deserialize_with = "acres_mode")]
    pub applied_acres_mode: Option<AppliedAcresMode>,
    /// `amount` covers the whole field rather than one acre
    #[serde(default, alias = "is_total", deserialize_with = "lenient_bool")]
    pub is_total_dose: bool,
}

impl LineItemRecord {
    pub fn new(recorded_unit: &str, amount: f64) -> Self {
        LineItemRecord {
            recorded_unit: recorded_unit.to_string(),
            amount,
            applied_acres: None,
            applied_acres_mode: None,
            is_total_dose: false,
        }
    }

    pub fn applied_acres(mut self, acres: f64) -> Self {
        self.applied_acres = Some(acres);
        self.applied_acres_mode = Some(AppliedAcresMode::Absolute);
        self
    }

    pub fn applied_percent(mut self, percent: f64) -> Self {
        self.applied_acres = Some(percent);
        self.applied_acres_mode = Some(AppliedAcresMode::Percent);
        self
    }

    pub fn total_dose(mut self) -> Self {
        self.is_total_dose = true;
        self
    }

    pub fn is_percent(&self) -> bool {
        self.applied_acres_mode == Some(AppliedAcresMode::Percent)
    }

    /// Parse from a record object. `units` and `amount` are required.
    pub fn from_value(value: &Value) -> Result<Self, AgriError> {
        require_fields(value, "line item", &[&["recorded_unit", "units"], &["amount"]])?;
        decode(value, "line item")
    }
}

/// Each entry lists the accepted spellings of one required field
fn require_fields(value: &Value, record: &str, fields: &[&[&str]]) -> Result<(), AgriError> {
    let map = value.as_object()
        .ok_or_else(|| AgriError::type_error("Object", value.type_name()).for_argument(record))?;
    for names in fields {
        let present = names.iter().any(|name| map.get(*name).map_or(false, |v| !v.is_null()));
        if !present {
            return Err(AgriError::missing_field(record, names[0]).for_argument(record));
        }
    }
    Ok(())
}

fn decode<T: for<'de> Deserialize<'de>>(value: &Value, record: &str) -> Result<T, AgriError> {
    serde_json::from_value(value.to_json()).map_err(|e| {
        AgriError::new(codes::TYPE_ERROR, format!("Invalid {} record: {}", record, e))
            .for_argument(record)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_from_stored_fields() {
        let value = Value::from(json!({
            "units": "per ton",
            "price": 4000,
            "density": 10,
            "liquid": true,
            "multiplier": null,
        }));
        let product = ProductRecord::from_value(&value).unwrap();
        assert_eq!(product, ProductRecord::new("per ton", 4000.0).liquid(10.0));

        let value = Value::from(json!({"units": "per ton", "price": "4000", "density": "10"}));
        let product = ProductRecord::from_value(&value).unwrap();
        assert_eq!(product.price, 4000.0);
        assert_eq!(product.density, Some(10.0));
        assert_eq!(product.is_liquid, None);
    }

    #[test]
    fn test_product_missing_units() {
        let err = ProductRecord::from_value(&Value::from(json!({"price": 12.5}))).unwrap_err();
        assert_eq!(err.code, codes::MISSING_FIELD);
        assert!(err.message.contains("pricing_unit"));
    }

    #[test]
    fn test_product_rust_names() {
        let value = Value::from(json!({
            "pricing_unit": "custom",
            "price": 4000,
            "custom_multiplier": 1000,
            "density_unit": "kg/l",
        }));
        let product = ProductRecord::from_value(&value).unwrap();
        assert_eq!(product.custom_multiplier, 1000.0);
        assert_eq!(product.density_unit.as_deref(), Some("kg/l"));
        assert_eq!(product.is_liquid, None);
    }

    #[test]
    fn test_line_item_from_stored_fields() {
        let value = Value::from(json!({
            "units": "gallons",
            "amount": 100,
            "applied_acres": "50",
            "applied_acres_units": "percent",
            "is_total": true,
        }));
        let item = LineItemRecord::from_value(&value).unwrap();
        assert_eq!(item, LineItemRecord::new("gallons", 100.0).applied_percent(50.0).total_dose());
        assert!(item.is_percent());
    }

    #[test]
    fn test_line_item_lenient_acres() {
        let value = Value::from(json!({
            "units": "lbs",
            "amount": 1,
            "applied_acres": "n/a",
            "applied_acres_units": "acres",
        }));
        let item = LineItemRecord::from_value(&value).unwrap();
        assert_eq!(item.applied_acres, None);
        assert_eq!(item.applied_acres_mode, Some(AppliedAcresMode::Absolute));
    }

    #[test]
    fn test_line_item_amount_as_text() {
        let value = Value::from(json!({"units": "lbs", "amount": " 100 "}));
        let item = LineItemRecord::from_value(&value).unwrap();
        assert_eq!(item.amount, 100.0);
    }

    #[test]
    fn test_flags_as_text_or_number() {
        let value = Value::from(json!({"units": "lbs", "amount": 1, "is_total": "true"}));
        assert!(LineItemRecord::from_value(&value).unwrap().is_total_dose);
        let value = Value::from(json!({"units": "lbs", "amount": 1, "is_total": 0}));
        assert!(!LineItemRecord::from_value(&value).unwrap().is_total_dose);
        let value = Value::from(json!({"units": "lbs", "amount": 1, "is_total": null}));
        assert!(!LineItemRecord::from_value(&value).unwrap().is_total_dose);

        let product = |liquid| ProductRecord::from_value(&Value::from(json!({"units": "per ton", "liquid": liquid})));
        assert_eq!(product(json!(1)).unwrap().is_liquid, Some(true));
        assert_eq!(product(json!("FALSE")).unwrap().is_liquid, Some(false));
        assert_eq!(product(json!("maybe")).unwrap().is_liquid, None);
        assert_eq!(product(json!(null)).unwrap().is_liquid, None);
    }

    #[test]
    fn test_line_item_missing_amount() {
        let err = LineItemRecord::from_value(&Value::from(json!({"units": "lbs"}))).unwrap_err();
        assert_eq!(err.code, codes::MISSING_FIELD);
        assert!(err.message.contains("amount"));

        let err = LineItemRecord::from_value(&Value::from(json!({"units": "lbs", "amount": "ten"}))).unwrap_err();
        assert_eq!(err.code, codes::TYPE_ERROR);

        let err = LineItemRecord::from_value(&Value::Number(1.0)).unwrap_err();
        assert_eq!(err.code, codes::TYPE_ERROR);
    }
}
