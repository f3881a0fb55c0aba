//! Unit converter algebra
//!
//! A converter is a pure `f64 -> f64` function drawn from a closed set of
//! variants. Converters compose with [`UnitConverter::concatenate`], invert
//! exactly with [`UnitConverter::inverse`], and compare structurally, so two
//! independently derived conversion paths with the same net transform are
//! equal and hash alike.
//!
//! Normal form invariants, maintained by every constructor:
//! - an affine converter never has scale 1 and offset 0 (that is `Identity`)
//! - a compound converter has at least two legs, none of them `Identity`,
//!   and no two adjacent legs that fuse (affine after affine, or a
//!   reciprocal leg followed by its own inverse)

use std::fmt;

use crate::{Factor, ReciprocalConverter, UnitError};

/// `y = scale * x + offset`
///
/// Fields are private: every map is built through [`UnitConverter`]
/// constructors, which reject a zero scale, so a map is always invertible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AffineMap {
    scale: Factor,
    offset: Factor,
}

impl AffineMap {
    pub fn scale(&self) -> &Factor {
        &self.scale
    }

    pub fn offset(&self) -> &Factor {
        &self.offset
    }

    #[inline]
    fn apply(&self, x: f64) -> f64 {
        self.scale.apply(x) + self.offset.to_f64()
    }

    /// `x = y / s - o / s`
    fn inverse(&self) -> UnitConverter {
        match Factor::one().checked_div(&self.scale) {
            Ok(inv) => {
                let inv_offset = self.offset.mul(&inv).neg();
                UnitConverter::normalized_affine(inv, inv_offset)
            }
            // Unreachable: no constructor admits a zero scale.
            Err(_) => {
                debug_assert!(false, "affine map with zero scale");
                UnitConverter::Identity
            }
        }
    }

    /// `then(self(x))`: s2 * (s1 * x + o1) + o2
    fn then(&self, then: &AffineMap) -> UnitConverter {
        let scale = then.scale.mul(&self.scale);
        let offset = then.scale.mul(&self.offset).add(&then.offset);
        UnitConverter::normalized_affine(scale, offset)
    }
}

/// Conversion function between two units
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitConverter {
    /// `y = x`
    Identity,
    /// `y = scale * x + offset`, scale non-zero
    Affine(AffineMap),
    /// Legs applied in order: the first leg sees the input value
    Compound(Vec<UnitConverter>),
    /// Non-linear `y = a / (x + b)` family
    Reciprocal(ReciprocalConverter),
}

impl UnitConverter {
    // ========== Construction ==========

    /// `y = scale * x`
    pub fn scale(scale: Factor) -> Result<Self, UnitError> {
        Self::affine(scale, Factor::zero())
    }

    /// `y = x + offset`
    pub fn offset(offset: Factor) -> Self {
        Self::normalized_affine(Factor::one(), offset)
    }

    /// `y = scale * x + offset`
    pub fn affine(scale: Factor, offset: Factor) -> Result<Self, UnitError> {
        if scale.is_zero() {
            return Err(UnitError::ZeroScale);
        }
        Ok(Self::normalized_affine(scale, offset))
    }

    pub fn reciprocal(converter: ReciprocalConverter) -> Self {
        UnitConverter::Reciprocal(converter)
    }

    fn normalized_affine(scale: Factor, offset: Factor) -> Self {
        if scale.is_one() && offset.is_zero() {
            UnitConverter::Identity
        } else {
            UnitConverter::Affine(AffineMap { scale, offset })
        }
    }

    // ========== Evaluation ==========

    #[inline]
    pub fn convert(&self, x: f64) -> f64 {
        match self {
            UnitConverter::Identity => x,
            UnitConverter::Affine(map) => map.apply(x),
            UnitConverter::Compound(legs) => legs.iter().fold(x, |acc, leg| leg.convert(acc)),
            UnitConverter::Reciprocal(r) => r.convert(x),
        }
    }

    /// True when this converter is a single affine transform. Anything
    /// involving a non-linear leg is non-linear.
    pub fn is_linear(&self) -> bool {
        match self {
            UnitConverter::Identity | UnitConverter::Affine(_) => true,
            UnitConverter::Compound(legs) => legs.iter().all(|leg| leg.is_linear()),
            UnitConverter::Reciprocal(_) => false,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, UnitConverter::Identity)
    }

    /// The scale factor when this converter is `y = k * x`
    pub fn proportional_factor(&self) -> Option<Factor> {
        match self {
            UnitConverter::Identity => Some(Factor::one()),
            UnitConverter::Affine(map) if map.offset.is_zero() => Some(map.scale.clone()),
            _ => None,
        }
    }

    // ========== Algebra ==========

    /// Exact algebraic inverse
    pub fn inverse(&self) -> UnitConverter {
        match self {
            UnitConverter::Identity => UnitConverter::Identity,
            UnitConverter::Affine(map) => map.inverse(),
            UnitConverter::Compound(legs) => Self::from_legs(legs.iter().rev().map(|leg| leg.inverse())),
            UnitConverter::Reciprocal(r) => UnitConverter::Reciprocal(r.inverse()),
        }
    }

    /// `self ∘ other`: convert by `other` first, then by `self`
    pub fn concatenate(&self, other: &UnitConverter) -> UnitConverter {
        Self::from_legs(other.legs().iter().chain(self.legs()).cloned())
    }

    fn legs(&self) -> &[UnitConverter] {
        match self {
            UnitConverter::Identity => &[],
            UnitConverter::Compound(legs) => legs,
            other => std::slice::from_ref(other),
        }
    }

    /// Build the normal form of a chain of legs (in application order)
    fn from_legs<I: IntoIterator<Item = UnitConverter>>(legs: I) -> UnitConverter {
        let mut chain: Vec<UnitConverter> = Vec::new();

        for leg in legs {
            let mut leg = leg;
            while let Some(fused) = chain.last().and_then(|prev| fuse(prev, &leg)) {
                chain.pop();
                leg = fused;
            }
            match leg {
                UnitConverter::Identity => {}
                UnitConverter::Compound(inner) => chain.extend(inner),
                other => chain.push(other),
            }
        }

        match chain.len() {
            0 => UnitConverter::Identity,
            1 => chain.pop().unwrap_or(UnitConverter::Identity),
            _ => UnitConverter::Compound(chain),
        }
    }
}

/// Collapse `then(first(x))` into a single leg when possible
fn fuse(first: &UnitConverter, then: &UnitConverter) -> Option<UnitConverter> {
    match (first, then) {
        (UnitConverter::Identity, other) | (other, UnitConverter::Identity) => Some(other.clone()),
        (UnitConverter::Affine(a), UnitConverter::Affine(b)) => Some(a.then(b)),
        (UnitConverter::Reciprocal(a), UnitConverter::Reciprocal(b)) if *b == a.inverse() => {
            Some(UnitConverter::Identity)
        }
        _ => None,
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        UnitConverter::Identity
    }
}

impl fmt::Display for UnitConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitConverter::Identity => write!(f, "x"),
            UnitConverter::Affine(map) if map.offset.is_zero() => write!(f, "{}·x", map.scale),
            UnitConverter::Affine(map) => write!(f, "{}·x + {}", map.scale, map.offset),
            UnitConverter::Compound(legs) => {
                let parts: Vec<String> = legs.iter().rev().map(|leg| format!("({})", leg)).collect();
                write!(f, "{}", parts.join(" ∘ "))
            }
            UnitConverter::Reciprocal(r) => write!(f, "{}", r),
        }
    }
}
