//! Unit representation: compound products of registered unit symbols

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use mensura_core::{UnitConverter, UnitError};
use serde::{Serialize, Serializer};

use crate::Dimension;

/// A named unit known to a registry
#[derive(Debug, Clone)]
pub struct UnitDef {
    /// The unit symbol (e.g., "m", "kg", "bar")
    pub symbol: String,
    /// The unit name (e.g., "meter", "kilogram", "bar")
    pub name: String,
    /// Reduced base-symbol signature
    pub dimension: Dimension,
    /// Converts values of this unit into the base representation
    pub to_base: UnitConverter,
    /// Whether SI prefixes may be attached to the symbol
    pub prefixable: bool,
}

impl UnitDef {
    /// A base unit: its own dimension, identity converter
    pub fn base(symbol: &str, name: &str) -> Self {
        UnitDef {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension: Dimension::base(symbol),
            to_base: UnitConverter::Identity,
            prefixable: true,
        }
    }

    /// Check if this is a base unit of its registry
    pub fn is_base(&self) -> bool {
        self.to_base.is_identity() && self.dimension == Dimension::base(&self.symbol)
    }
}

/// Largest exponent magnitude a single term may carry
pub const MAX_EXPONENT: i32 = 1024;

fn in_range(exponent: i32) -> bool {
    exponent.unsigned_abs() <= MAX_EXPONENT.unsigned_abs()
}

fn exponent_overflow(def: &UnitDef) -> UnitError {
    UnitError::ExponentOverflow {
        symbol: def.symbol.clone(),
    }
}

/// One factor of a compound unit: a unit raised to a non-zero exponent of
/// magnitude at most [`MAX_EXPONENT`]
#[derive(Debug, Clone)]
pub struct Term {
    def: Arc<UnitDef>,
    exponent: i32,
}

impl Term {
    pub fn symbol(&self) -> &str {
        &self.def.symbol
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn def(&self) -> &UnitDef {
        &self.def
    }
}

/// An immutable compound unit
///
/// Terms are kept in order of first appearance with like symbols combined
/// and zero exponents dropped. Equality and hashing ignore term order.
#[derive(Debug, Clone, Default)]
pub struct Unit {
    terms: Vec<Term>,
}

impl Unit {
    /// The dimensionless unit
    pub fn one() -> Self {
        Unit { terms: Vec::new() }
    }

    /// A unit consisting of a single registered symbol
    pub fn from_def(def: Arc<UnitDef>) -> Self {
        Unit {
            terms: vec![Term { def, exponent: 1 }],
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn is_one(&self) -> bool {
        self.terms.is_empty()
    }

    /// The symbol when this unit is a single term with exponent 1
    pub fn symbol(&self) -> Option<&str> {
        match self.terms.as_slice() {
            [term] if term.exponent == 1 => Some(term.symbol()),
            _ => None,
        }
    }

    // ========== Algebra ==========

    /// Multiply two units (e.g., m * m -> m²)
    pub fn multiply(&self, other: &Unit) -> Result<Unit, UnitError> {
        let mut result = self.clone();
        for term in &other.terms {
            result.accumulate(&term.def, term.exponent)?;
        }
        Ok(result)
    }

    /// Divide two units (e.g., m / s -> m/s)
    pub fn divide(&self, other: &Unit) -> Result<Unit, UnitError> {
        self.multiply(&other.inverse()?)
    }

    /// Raise unit to an integer power (e.g., m^2, s^-1)
    pub fn pow(&self, exp: i32) -> Result<Unit, UnitError> {
        if exp == 0 {
            return Ok(Unit::one());
        }
        let terms = self
            .terms
            .iter()
            .map(|t| {
                let exponent = t.exponent.checked_mul(exp).filter(|e| in_range(*e));
                match exponent {
                    Some(exponent) => Ok(Term {
                        def: Arc::clone(&t.def),
                        exponent,
                    }),
                    None => Err(exponent_overflow(&t.def)),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(Unit { terms })
    }

    /// Get the inverse unit (e.g., Hz -> 1/Hz)
    pub fn inverse(&self) -> Result<Unit, UnitError> {
        self.pow(-1)
    }

    fn accumulate(&mut self, def: &Arc<UnitDef>, exponent: i32) -> Result<(), UnitError> {
        match self.terms.iter().position(|t| t.def.symbol == def.symbol) {
            Some(i) => {
                let total = self.terms[i]
                    .exponent
                    .checked_add(exponent)
                    .filter(|e| in_range(*e))
                    .ok_or_else(|| exponent_overflow(def))?;
                if total == 0 {
                    self.terms.remove(i);
                } else {
                    self.terms[i].exponent = total;
                }
            }
            None if exponent != 0 => self.terms.push(Term {
                def: Arc::clone(def),
                exponent,
            }),
            None => {}
        }
        Ok(())
    }

    // ========== Conversion ==========

    /// Reduced base-symbol signature
    pub fn dimension(&self) -> Result<Dimension, UnitError> {
        self.terms.iter().try_fold(Dimension::dimensionless(), |acc, t| {
            acc.multiply(&t.def.dimension.power(t.exponent)?)
        })
    }

    /// Check if two units can be converted into each other
    pub fn is_commensurable(&self, other: &Unit) -> bool {
        matches!((self.dimension(), other.dimension()), (Ok(a), Ok(b)) if a == b)
    }

    /// Converter from this unit to its base representation
    ///
    /// A lone symbol keeps its own converter, so offset and non-linear units
    /// (°C, API) convert fine on their own. Inside a product every term must
    /// be proportional.
    pub fn converter_to_base(&self) -> Result<UnitConverter, UnitError> {
        if let [term] = self.terms.as_slice() {
            if term.exponent == 1 {
                return Ok(term.def.to_base.clone());
            }
        }

        let mut factor = mensura_core::Factor::one();
        for term in &self.terms {
            let scale = term
                .def
                .to_base
                .proportional_factor()
                .ok_or_else(|| UnitError::NonProportionalTerm {
                    symbol: term.def.symbol.clone(),
                })?;
            factor = factor.mul(&scale.pow(term.exponent)?);
        }
        UnitConverter::scale(factor)
    }

    /// Converter from this unit to `target`, computed without caching
    pub fn converter_to(&self, target: &Unit) -> Result<UnitConverter, UnitError> {
        if self == target {
            return Ok(UnitConverter::Identity);
        }
        if self.dimension()? != target.dimension()? {
            return Err(UnitError::IncommensurableUnits {
                from: self.to_string(),
                to: target.to_string(),
            });
        }

        let source_to_base = self.converter_to_base()?;
        let target_to_base = target.converter_to_base()?;
        Ok(target_to_base.inverse().concatenate(&source_to_base))
    }

    /// Order-independent reduced form used for equality and hashing
    fn reduced_key(&self) -> Vec<(&str, i32)> {
        let mut key: Vec<(&str, i32)> = self.terms.iter().map(|t| (t.symbol(), t.exponent)).collect();
        key.sort_unstable();
        key
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.terms.len() == other.terms.len() && self.reduced_key() == other.reduced_key()
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.reduced_key().hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::format::write_canonical(f, &self.terms)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
