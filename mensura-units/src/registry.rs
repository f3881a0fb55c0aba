//! Unit registry: symbol lookup, aliases and SI prefixes

use std::collections::HashMap;
use std::sync::Arc;

use mensura_core::{Factor, UnitConverter, UnitError};
use tracing::trace;

use crate::parse::parse_unit;
use crate::unit::UnitDef;

/// SI prefixes, longest first where one is a prefix of another ("da" / "d")
const PREFIXES: [(&str, &str, i32); 22] = [
    ("Y", "yotta", 24),
    ("Z", "zetta", 21),
    ("E", "exa", 18),
    ("P", "peta", 15),
    ("T", "tera", 12),
    ("G", "giga", 9),
    ("M", "mega", 6),
    ("k", "kilo", 3),
    ("h", "hecto", 2),
    ("da", "deka", 1),
    ("d", "deci", -1),
    ("c", "centi", -2),
    ("m", "milli", -3),
    ("µ", "micro", -6),
    ("μ", "micro", -6),
    ("u", "micro", -6),
    ("n", "nano", -9),
    ("p", "pico", -12),
    ("f", "femto", -15),
    ("a", "atto", -18),
    ("z", "zepto", -21),
    ("y", "yocto", -24),
];

/// Registry of known units
///
/// Immutable once built; share it behind an `Arc` across threads.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, Arc<UnitDef>>,
    aliases: HashMap<String, String>,
    allow_prefixes: bool,
}

impl UnitRegistry {
    /// Empty registry
    pub fn new() -> Self {
        UnitRegistry {
            units: HashMap::new(),
            aliases: HashMap::new(),
            allow_prefixes: true,
        }
    }

    /// Registry populated with the standard catalog
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::catalog::register_standard_units(&mut registry);
        registry
    }

    /// Enable or disable on-demand SI prefix resolution
    pub fn with_prefixes(mut self, enabled: bool) -> Self {
        self.allow_prefixes = enabled;
        self
    }

    // ========== Lookup ==========

    /// Get a unit by symbol, alias, or prefixed symbol
    pub fn resolve_symbol(&self, symbol: &str) -> Option<Arc<UnitDef>> {
        if let Some(def) = self.units.get(symbol) {
            return Some(Arc::clone(def));
        }
        if let Some(canonical) = self.aliases.get(symbol) {
            return self.units.get(canonical).cloned();
        }
        if self.allow_prefixes {
            return self.resolve_prefixed(symbol);
        }
        None
    }

    fn resolve_prefixed(&self, symbol: &str) -> Option<Arc<UnitDef>> {
        for (prefix, prefix_name, exponent) in PREFIXES {
            let Some(rest) = symbol.strip_prefix(prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            let Some(def) = self.resolve_symbol(rest) else {
                continue;
            };
            if !def.prefixable {
                continue;
            }

            let scale = UnitConverter::scale(Factor::from_i64(10).pow(exponent).ok()?).ok()?;
            return Some(Arc::new(UnitDef {
                symbol: symbol.to_string(),
                name: format!("{}{}", prefix_name, def.name),
                dimension: def.dimension.clone(),
                to_base: def.to_base.concatenate(&scale),
                prefixable: true,
            }));
        }
        None
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.resolve_symbol(symbol).is_some()
    }

    /// Get all registered unit symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.units.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    // ========== Registration ==========

    /// Define a new base unit
    pub fn define_base(&mut self, symbol: &str, name: &str) -> Result<(), UnitError> {
        self.insert(UnitDef::base(symbol, name))
    }

    /// Define a base unit that does not take SI prefixes
    pub fn define_unprefixed_base(&mut self, symbol: &str, name: &str) -> Result<(), UnitError> {
        let mut def = UnitDef::base(symbol, name);
        def.prefixable = false;
        self.insert(def)
    }

    /// Define a unit in terms of an expression over already-known units.
    ///
    /// `to_reference` converts a value of the new unit into the reference
    /// unit: `define("h", "hour", "s", scale(3600))`.
    pub fn define(
        &mut self,
        symbol: &str,
        name: &str,
        reference: &str,
        to_reference: UnitConverter,
    ) -> Result<(), UnitError> {
        let def = self.derive(symbol, name, reference, to_reference, false)?;
        self.insert(def)
    }

    /// Like [`define`](Self::define), but the unit accepts SI prefixes when
    /// its conversion is proportional.
    pub fn define_si(
        &mut self,
        symbol: &str,
        name: &str,
        reference: &str,
        to_reference: UnitConverter,
    ) -> Result<(), UnitError> {
        let def = self.derive(symbol, name, reference, to_reference, true)?;
        self.insert(def)
    }

    /// Define a unit as an exact multiple of a reference expression
    pub fn define_scaled(
        &mut self,
        symbol: &str,
        name: &str,
        reference: &str,
        factor: &str,
    ) -> Result<(), UnitError> {
        let scale = UnitConverter::scale(factor.parse()?)?;
        self.define(symbol, name, reference, scale)
    }

    /// Register another spelling for an existing symbol
    pub fn alias(&mut self, alias: &str, symbol: &str) -> Result<(), UnitError> {
        if !self.units.contains_key(symbol) {
            return Err(UnitError::UnknownSymbol {
                symbol: symbol.to_string(),
                index: 0,
            });
        }
        if self.units.contains_key(alias) || self.aliases.contains_key(alias) {
            return Err(UnitError::DuplicateSymbol {
                symbol: alias.to_string(),
            });
        }
        self.aliases.insert(alias.to_string(), symbol.to_string());
        Ok(())
    }

    fn derive(
        &self,
        symbol: &str,
        name: &str,
        reference: &str,
        to_reference: UnitConverter,
        prefixable: bool,
    ) -> Result<UnitDef, UnitError> {
        let reference = parse_unit(self, reference)?;
        let to_base = reference.converter_to_base()?.concatenate(&to_reference);
        let prefixable = prefixable && to_base.proportional_factor().is_some();

        Ok(UnitDef {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension: reference.dimension()?,
            to_base,
            prefixable,
        })
    }

    fn insert(&mut self, def: UnitDef) -> Result<(), UnitError> {
        if self.units.contains_key(&def.symbol) || self.aliases.contains_key(&def.symbol) {
            return Err(UnitError::DuplicateSymbol { symbol: def.symbol });
        }
        trace!(symbol = %def.symbol, base = def.is_base(), dimension = %def.dimension, converter = %def.to_base, "unit defined");
        self.units.insert(def.symbol.clone(), Arc::new(def));
        Ok(())
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}
