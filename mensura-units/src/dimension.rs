//! Dimensional signatures
//!
//! A dimension is the reduced product of base-unit symbols raised to integer
//! exponents, e.g. `kg·m·s⁻²` for force. Unlike a fixed seven-slot SI vector,
//! the set of base symbols is open: registries may define dimensionally
//! distinct "unitless" bases such as `SG` and `ppm`. Two units are
//! commensurable exactly when their dimensions are equal.

use std::collections::BTreeMap;
use std::fmt;

use mensura_core::UnitError;
use serde::{Deserialize, Serialize};

/// Exponents of base-unit symbols. Zero exponents are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    exponents: BTreeMap<String, i32>,
}

impl Dimension {
    /// Dimensionless quantity (no base symbols)
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// Dimension of a base unit
    pub fn base(symbol: &str) -> Self {
        let mut exponents = BTreeMap::new();
        exponents.insert(symbol.to_string(), 1);
        Dimension { exponents }
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Exponent of a base symbol (0 when absent)
    pub fn exponent(&self, symbol: &str) -> i32 {
        self.exponents.get(symbol).copied().unwrap_or(0)
    }

    /// Base symbols with non-zero exponents, sorted by symbol
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.exponents.iter().map(|(s, e)| (s.as_str(), *e))
    }

    /// Multiply dimensions (add exponents)
    pub fn multiply(&self, other: &Dimension) -> Result<Dimension, UnitError> {
        let mut result = self.clone();
        for (symbol, exp) in &other.exponents {
            result.accumulate(symbol, *exp)?;
        }
        Ok(result)
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &Dimension) -> Result<Dimension, UnitError> {
        self.multiply(&other.invert()?)
    }

    /// Raise to integer power (multiply exponents)
    pub fn power(&self, exp: i32) -> Result<Dimension, UnitError> {
        if exp == 0 {
            return Ok(Dimension::dimensionless());
        }
        let exponents = self
            .exponents
            .iter()
            .map(|(s, e)| e.checked_mul(exp).map(|e| (s.clone(), e)).ok_or_else(|| overflow(s)))
            .collect::<Result<_, _>>()?;
        Ok(Dimension { exponents })
    }

    /// Invert dimensions (negate exponents)
    pub fn invert(&self) -> Result<Dimension, UnitError> {
        self.power(-1)
    }

    fn accumulate(&mut self, symbol: &str, exp: i32) -> Result<(), UnitError> {
        let total = self.exponent(symbol).checked_add(exp).ok_or_else(|| overflow(symbol))?;
        if total == 0 {
            self.exponents.remove(symbol);
        } else {
            self.exponents.insert(symbol.to_string(), total);
        }
        Ok(())
    }
}

fn overflow(symbol: &str) -> UnitError {
    UnitError::ExponentOverflow {
        symbol: symbol.to_string(),
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponents.is_empty() {
            return write!(f, "1");
        }

        let parts: Vec<String> = self
            .exponents
            .iter()
            .map(|(symbol, &exp)| {
                if exp == 1 {
                    symbol.clone()
                } else {
                    format!("{}^{}", symbol, exp)
                }
            })
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn force() -> Dimension {
        Dimension::base("kg")
            .multiply(&Dimension::base("m"))
            .and_then(|d| d.divide(&Dimension::base("s").power(2)?))
            .unwrap()
    }

    #[test]
    fn test_dimensionless() {
        assert!(Dimension::dimensionless().is_dimensionless());
        assert!(!Dimension::base("m").is_dimensionless());
    }

    #[test]
    fn test_force() {
        let f = force();
        assert_eq!(f.exponent("kg"), 1);
        assert_eq!(f.exponent("m"), 1);
        assert_eq!(f.exponent("s"), -2);
        assert_eq!(f.exponent("A"), 0);
    }

    #[test]
    fn test_cancellation_drops_terms() {
        let velocity = Dimension::base("m").divide(&Dimension::base("s")).unwrap();
        let back = velocity.multiply(&Dimension::base("s")).unwrap();
        assert_eq!(back, Dimension::base("m"));
        assert!(velocity.divide(&velocity).unwrap().is_dimensionless());
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        let m = Dimension::base("m");
        assert_eq!(
            m.power(i32::MAX).unwrap().multiply(&m),
            Err(UnitError::ExponentOverflow { symbol: "m".to_string() })
        );
        assert!(m.power(i32::MIN).unwrap().invert().is_err());
        assert!(force().power(2_000_000_000).is_err());
    }

    #[test]
    fn test_distinct_unitless_bases_differ() {
        assert_ne!(Dimension::base("SG"), Dimension::base("ppm"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimension::dimensionless().to_string(), "1");
        assert_eq!(Dimension::base("m").to_string(), "[m]");
        assert_eq!(force().to_string(), "[kg m s^-2]");
    }
}
