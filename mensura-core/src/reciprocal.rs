//! Non-linear reciprocal converters
//!
//! Covers transforms of the form `y = a / (x + b)` whose exact algebraic
//! inverse is `x = a / y - b`. The API gravity scale is the standard member
//! of this family: specific gravity = 141.5 / (API + 131.5).
//!
//! These converters are NOT linear. Callers that special-case affine
//! converters must check [`crate::UnitConverter::is_linear`] first.

use std::fmt;

use crate::{Factor, UnitError};

/// `y = a / (x + b)`, or its inverse `y = a / x - b` when `inverted`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReciprocalConverter {
    numerator: Factor,
    shift: Factor,
    inverted: bool,
}

impl ReciprocalConverter {
    /// Forward transform `y = numerator / (x + shift)`
    pub fn new(numerator: Factor, shift: Factor) -> Result<Self, UnitError> {
        if numerator.is_zero() {
            return Err(UnitError::ZeroScale);
        }
        Ok(Self {
            numerator,
            shift,
            inverted: false,
        })
    }

    /// Degrees API to specific gravity (60°F reference)
    pub fn api_gravity() -> Self {
        Self {
            numerator: Factor::from_ratio(283, 2),
            shift: Factor::from_ratio(263, 2),
            inverted: false,
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn inverse(&self) -> Self {
        Self {
            numerator: self.numerator.clone(),
            shift: self.shift.clone(),
            inverted: !self.inverted,
        }
    }

    /// Undefined at `x = -shift` (forward) and `x = 0` (inverse); IEEE
    /// infinities are returned there.
    #[inline]
    pub fn convert(&self, x: f64) -> f64 {
        let a = self.numerator.to_f64();
        let b = self.shift.to_f64();
        if self.inverted {
            a / x - b
        } else {
            a / (x + b)
        }
    }
}

impl fmt::Display for ReciprocalConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inverted() {
            write!(f, "{}/x - {}", self.numerator, self.shift)
        } else {
            write!(f, "{}/(x + {})", self.numerator, self.shift)
        }
    }
}
