//! Unit registry
//!
//! `RegistryBuilder` expands definition tables into a flat lookup of every
//! spelling a unit answers to. Each definition registers:
//!
//! - its short key (primary, must be unique)
//! - its full name and the plural of the full name (skipped if taken)
//! - each alias (primary, must be unique) and the alias plural (skipped if taken)
//!
//! `build()` freezes the result into a `UnitRegistry`, which is shared
//! read-only behind an `Arc`.

use std::collections::HashMap;
use tracing::{debug, trace};
use crate::{DefinitionTable, Quantity, UnitDefinition, UnitDescriptor, UnitError, UnitGroup};
use crate::definitions::standard_tables;

/// Something that names a unit: a raw name or an already-resolved quantity
#[derive(Debug, Clone, Copy)]
pub enum UnitRef<'a> {
    Name(&'a str),
    Resolved(&'a Quantity),
}

impl<'a> From<&'a str> for UnitRef<'a> {
    fn from(name: &'a str) -> Self {
        UnitRef::Name(name)
    }
}

impl<'a> From<&'a String> for UnitRef<'a> {
    fn from(name: &'a String) -> Self {
        UnitRef::Name(name.as_str())
    }
}

impl<'a> From<&'a Quantity> for UnitRef<'a> {
    fn from(quantity: &'a Quantity) -> Self {
        UnitRef::Resolved(quantity)
    }
}

/// English plural used for derived spellings
fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        format!("{}es", name)
    } else {
        format!("{}s", name)
    }
}

/// Accumulates definition tables into a registry
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<UnitDescriptor>,
    index: HashMap<String, usize>,
    selectable: HashMap<UnitGroup, Vec<String>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole table
    pub fn register_table(self, table: &DefinitionTable) -> Result<Self, UnitError> {
        self.register_group(table.group, &table.units)
    }

    /// Register every definition of one group, in order
    pub fn register_group(mut self, group: UnitGroup, definitions: &[UnitDefinition]) -> Result<Self, UnitError> {
        for def in definitions {
            let slot = self.descriptors.len();
            self.descriptors.push(UnitDescriptor::new(group, def.value, &def.key, &def.name));

            self.add_primary(&def.key, slot)?;
            self.add_secondary(&def.name, slot);
            self.add_secondary(&pluralize(&def.name), slot);

            for alias in &def.aliases {
                self.add_primary(alias, slot)?;
                self.add_secondary(&pluralize(alias), slot);
            }

            if let Some(display) = &def.selectable_as {
                let list = self.selectable.entry(group).or_default();
                if def.default {
                    list.insert(0, display.clone());
                } else {
                    list.push(display.clone());
                }
            }
        }
        Ok(self)
    }

    fn add_primary(&mut self, name: &str, slot: usize) -> Result<(), UnitError> {
        if self.index.contains_key(name) {
            return Err(UnitError::Redefinition { name: name.to_string() });
        }
        self.index.insert(name.to_string(), slot);
        Ok(())
    }

    fn add_secondary(&mut self, name: &str, slot: usize) {
        if self.index.contains_key(name) {
            trace!(name, "skipping already registered unit spelling");
            return;
        }
        self.index.insert(name.to_string(), slot);
    }

    pub fn build(self) -> UnitRegistry {
        debug!(
            units = self.descriptors.len(),
            names = self.index.len(),
            groups = self.selectable.len(),
            "built unit registry"
        );
        UnitRegistry {
            descriptors: self.descriptors,
            index: self.index,
            selectable: self.selectable,
        }
    }
}

/// Immutable lookup of unit names to descriptors
#[derive(Debug)]
pub struct UnitRegistry {
    descriptors: Vec<UnitDescriptor>,
    index: HashMap<String, usize>,
    selectable: HashMap<UnitGroup, Vec<String>>,
}

impl UnitRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry holding the built-in liquid, weight, seed, yield and area tables
    pub fn standard() -> Result<Self, UnitError> {
        standard_tables()
            .iter()
            .try_fold(RegistryBuilder::new(), |builder, table| builder.register_table(table))
            .map(RegistryBuilder::build)
    }

    pub fn resolve<'a>(&self, unit: impl Into<UnitRef<'a>>) -> Result<&UnitDescriptor, UnitError> {
        let name = match unit.into() {
            UnitRef::Name(name) => name,
            UnitRef::Resolved(quantity) => quantity.unit(),
        };
        self.index
            .get(name)
            .and_then(|&slot| self.descriptors.get(slot))
            .ok_or_else(|| UnitError::undefined(name))
    }

    /// Whether two units share a group. Unknown names are an error.
    pub fn are_compatible<'a, 'b>(
        &self,
        a: impl Into<UnitRef<'a>>,
        b: impl Into<UnitRef<'b>>,
    ) -> Result<bool, UnitError> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        Ok(a.is_compatible(b))
    }

    /// Display names for a group, default first. Empty if the group has none.
    pub fn selectable_units(&self, group: UnitGroup) -> &[String] {
        self.selectable.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered spellings
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Sorted names registered for a group
    pub fn names_in_group(&self, group: UnitGroup) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.iter()
            .filter(|(_, slot)| self.descriptors[**slot].group == group)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
