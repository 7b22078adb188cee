//! Unit definition tables
//!
//! A definition is the terse form of a unit: a short key, a full name, a
//! ratio to the group base, and optional aliases. The registry expands each
//! definition into every spelling it answers to (see `RegistryBuilder`).
//!
//! The built-in tables cover the agricultural groups. Extra tables can be
//! loaded from JSON:
//!
//! ```json
//! {"group": "weight", "units": [
//!     {"key": "lbs", "name": "pound", "value": 453.592375,
//!      "aliases": ["lb"], "selectable_as": "lbs", "default": true}
//! ]}
//! ```

use serde::{Serialize, Deserialize};
use crate::UnitGroup;

fn unit_ratio() -> f64 {
    1.0
}

/// One entry of a definition table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    /// Short name, registered as the canonical key
    pub key: String,
    /// Singular full name
    pub name: String,
    /// Ratio to the group base unit
    #[serde(default = "unit_ratio")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Display name for unit pickers. Units without one are not listed.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "selectableAs")]
    pub selectable_as: Option<String>,
    /// Listed first among the group's selectable units
    #[serde(default)]
    pub default: bool,
}

impl UnitDefinition {
    pub fn new(key: &str, name: &str, value: f64) -> Self {
        UnitDefinition {
            key: key.to_string(),
            name: name.to_string(),
            value,
            aliases: Vec::new(),
            selectable_as: None,
            default: false,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn selectable(mut self, display: &str) -> Self {
        self.selectable_as = Some(display.to_string());
        self
    }

    pub fn default_unit(mut self) -> Self {
        self.default = true;
        self
    }
}

/// All definitions for one group, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionTable {
    pub group: UnitGroup,
    pub units: Vec<UnitDefinition>,
}

impl DefinitionTable {
    pub fn new(group: UnitGroup, units: Vec<UnitDefinition>) -> Self {
        DefinitionTable { group, units }
    }

    /// Load a table from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Liquid volumes, base liter
pub fn liquid_table() -> DefinitionTable {
    DefinitionTable::new(UnitGroup::Liquid, vec![
        UnitDefinition::new("l", "liter", 1.0).alias("litre").selectable("liters"),
        UnitDefinition::new("ml", "milliliter", 0.001).selectable("milliliters"),
        UnitDefinition::new("pt", "pint", 0.473176473).selectable("pints"),
        UnitDefinition::new("qt", "quart", 0.946352946).selectable("quarts"),
        UnitDefinition::new("gal", "gallon", 3.785411784).selectable("gallons").default_unit(),
        UnitDefinition::new("floz", "fluid ounce", 0.02957353).alias("fl oz").selectable("floz"),
    ])
}

/// Solid weights, base gram
pub fn weight_table() -> DefinitionTable {
    DefinitionTable::new(UnitGroup::Weight, vec![
        UnitDefinition::new("lbs", "pound", 453.592375).alias("lb").selectable("lbs").default_unit(),
        UnitDefinition::new("oz", "ounce", 28.349523125).selectable("oz"),
        UnitDefinition::new("ton", "ton", 907184.74).selectable("tons"),
        UnitDefinition::new("g", "gram", 1.0).selectable("grams"),
        UnitDefinition::new("mg", "milligram", 0.001),
        UnitDefinition::new("kg", "kilogram", 1000.0).selectable("kilograms"),
        UnitDefinition::new("t", "metric ton", 1_000_000.0).alias("tonne").selectable("metric tons"),
    ])
}

/// Seed counts, base one seed
pub fn seed_table() -> DefinitionTable {
    DefinitionTable::new(UnitGroup::Seed, vec![
        UnitDefinition::new("seed", "seed", 1.0).selectable("seeds"),
        UnitDefinition::new("bag", "bag", 80_000.0).selectable("bags"),
        UnitDefinition::new("units - 130k", "units - 130k", 130_000.0)
            .alias("units130k")
            .selectable("units - 130k"),
        UnitDefinition::new("units - 140k", "units - 140k", 140_000.0)
            .alias("units140k")
            .selectable("units - 140k"),
    ])
}

/// Harvest yield, base bushel
pub fn yield_table() -> DefinitionTable {
    DefinitionTable::new(UnitGroup::Yield, vec![
        UnitDefinition::new("bu", "bushel", 1.0).selectable("bushels").default_unit(),
    ])
}

/// Land area, base acre
pub fn area_table() -> DefinitionTable {
    DefinitionTable::new(UnitGroup::Area, vec![
        UnitDefinition::new("ac", "acre", 1.0).selectable("acres").default_unit(),
        UnitDefinition::new("ha", "hectare", 2.4710562857).selectable("hectare"),
    ])
}

/// Built-in tables in registration order
pub fn standard_tables() -> Vec<DefinitionTable> {
    vec![liquid_table(), weight_table(), seed_table(), yield_table(), area_table()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables_cover_every_group() {
        let groups: Vec<UnitGroup> = standard_tables().iter().map(|t| t.group).collect();
        assert_eq!(groups, UnitGroup::ALL.to_vec());
    }

    #[test]
    fn test_from_json_defaults() {
        let table = DefinitionTable::from_json(r#"{
            "group": "weight",
            "units": [
                {"key": "cwt", "name": "hundredweight", "value": 45359.237, "selectableAs": "cwt"},
                {"key": "grain", "name": "grain"}
            ]
        }"#).unwrap();

        assert_eq!(table.group, UnitGroup::Weight);
        assert_eq!(table.units[0].selectable_as.as_deref(), Some("cwt"));
        assert!(!table.units[0].default);
        assert_eq!(table.units[1].value, 1.0);
        assert!(table.units[1].aliases.is_empty());
    }

    #[test]
    fn test_from_json_rejects_unknown_group() {
        let err = DefinitionTable::from_json(r#"{"group": "temperature", "units": []}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let table = seed_table();
        let json = table.to_json().unwrap();
        assert_eq!(DefinitionTable::from_json(&json).unwrap(), table);
    }
}
