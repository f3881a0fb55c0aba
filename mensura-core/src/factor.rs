//! Exact rational factors using dashu
//!
//! Scale factors and offsets of unit converters are kept as exact rationals
//! (dashu-ratio's RBig) so that converters derived along different paths
//! compare and hash equal. The f64 numerator and denominator are cached for
//! the conversion hot path.

use dashu_base::Approximation;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::UnitError;

/// Exact rational number with a cached floating point form
#[derive(Debug, Clone)]
pub struct Factor {
    exact: RBig,
    numer: f64,
    denom: f64,
}

impl Factor {
    fn from_rbig(exact: RBig) -> Self {
        let (numer, denom) = split_f64(&exact);
        Self { exact, numer, denom }
    }

    /// The factor 0
    pub fn zero() -> Self {
        Self::from_rbig(RBig::ZERO)
    }

    /// The factor 1
    pub fn one() -> Self {
        Self::from_rbig(RBig::ONE)
    }

    /// Create from i64
    pub fn from_i64(n: i64) -> Self {
        Self::from_rbig(RBig::from(IBig::from(n)))
    }

    /// Create from ratio (exact division). A zero denominator yields zero.
    pub fn from_ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Self::zero();
        }
        Self::from_rbig(RBig::from(IBig::from(num)) / RBig::from(IBig::from(den)))
    }

    // ========== Predicates ==========

    pub fn is_zero(&self) -> bool {
        self.exact == RBig::ZERO
    }

    pub fn is_one(&self) -> bool {
        self.exact == RBig::ONE
    }

    // ========== Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        Self::from_rbig(&self.exact + &other.exact)
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self::from_rbig(&self.exact * &other.exact)
    }

    pub fn neg(&self) -> Self {
        Self::from_rbig(-self.exact.clone())
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, UnitError> {
        if other.is_zero() {
            Err(UnitError::ZeroScale)
        } else {
            Ok(Self::from_rbig(&self.exact / &other.exact))
        }
    }

    /// Integer power (exact). Zero raised to a negative power is an error.
    pub fn pow(&self, exp: i32) -> Result<Self, UnitError> {
        let n = exp.unsigned_abs() as usize;
        let numer = self.exact.numerator().pow(n);
        let denom = self.exact.denominator().pow(n);
        let result = Self::from_rbig(RBig::from_parts(numer, denom));

        if exp < 0 {
            Self::one().checked_div(&result)
        } else {
            Ok(result)
        }
    }

    // ========== Conversion ==========

    /// Multiply a float by this factor as `x * numerator / denominator`
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        x * self.numer / self.denom
    }

    /// Floating point value of this factor
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.numer / self.denom
    }
}

fn approximate(value: &RBig) -> f64 {
    match value.to_f64() {
        Approximation::Exact(v) => v,
        Approximation::Inexact(v, _) => v,
    }
}

/// Split into an f64 numerator/denominator pair when both fit in 64 bits.
/// Keeps 100000 * (1/100000) exact where a premultiplied 1e-5 would not be.
fn split_f64(value: &RBig) -> (f64, f64) {
    let numer = i64::try_from(value.numerator().clone());
    let denom = u64::try_from(value.denominator().clone());
    match (numer, denom) {
        (Ok(n), Ok(d)) => (n as f64, d as f64),
        _ => (approximate(value), 1.0),
    }
}

impl FromStr for Factor {
    type Err = UnitError;

    /// Supports: "123", "0.0254", "-1.5e-3", "5/9"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || UnitError::InvalidNumber { input: s.to_string() };

        if let Some((num, den)) = s.split_once('/') {
            let num: Factor = num.parse()?;
            let den: Factor = den.parse()?;
            return num.checked_div(&den).map_err(|_| invalid());
        }

        let lower = s.to_ascii_lowercase();
        let (mantissa, exponent) = match lower.split_once('e') {
            Some((m, e)) => (m, e.parse::<i32>().map_err(|_| invalid())?),
            None => (lower.as_str(), 0),
        };

        let (negative, unsigned) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }

        let digits = format!("{}{}", int_part, frac_part);
        let mut significand: IBig = digits.parse().map_err(|_| invalid())?;
        if negative {
            significand = -significand;
        }

        let frac_len = i32::try_from(frac_part.len()).map_err(|_| invalid())?;
        let scale = exponent - frac_len;
        let ten = UBig::from(10u8);
        let exact = if scale >= 0 {
            RBig::from(significand * IBig::from(ten.pow(scale as usize)))
        } else {
            RBig::from_parts(significand, ten.pow(scale.unsigned_abs() as usize))
        };

        Ok(Self::from_rbig(exact))
    }
}

impl PartialEq for Factor {
    fn eq(&self, other: &Self) -> bool {
        self.exact == other.exact
    }
}

impl Eq for Factor {}

impl Hash for Factor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.exact.hash(state);
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1.0 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}", self.exact)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_integer() {
        let f: Factor = "1000".parse().unwrap();
        assert_eq!(f, Factor::from_i64(1000));
    }

    #[test]
    fn test_from_str_decimal_is_exact() {
        let inch: Factor = "0.0254".parse().unwrap();
        assert_eq!(inch, Factor::from_ratio(254, 10000));
    }

    #[test]
    fn test_from_str_scientific() {
        let f: Factor = "1.5e-3".parse().unwrap();
        assert_eq!(f, Factor::from_ratio(15, 10000));

        let f: Factor = "-2E2".parse().unwrap();
        assert_eq!(f, Factor::from_i64(-200));
    }

    #[test]
    fn test_from_str_fraction() {
        let f: Factor = "5/9".parse().unwrap();
        assert_eq!(f, Factor::from_ratio(10, 18));
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("".parse::<Factor>().is_err());
        assert!("abc".parse::<Factor>().is_err());
        assert!("1.2.3".parse::<Factor>().is_err());
        assert!("1/0".parse::<Factor>().is_err());
    }

    #[test]
    fn test_apply_keeps_reciprocal_scales_exact() {
        let pascal_per_bar = Factor::from_ratio(1, 100_000);
        assert_eq!(pascal_per_bar.apply(100_000.0), 1.0);
    }

    #[test]
    fn test_pow() {
        let thousand = Factor::from_i64(10).pow(3).unwrap();
        assert_eq!(thousand, Factor::from_i64(1000));

        let milli = Factor::from_i64(10).pow(-3).unwrap();
        assert_eq!(milli, Factor::from_ratio(1, 1000));

        assert!(Factor::zero().pow(-1).is_err());
        assert!(Factor::from_i64(7).pow(0).unwrap().is_one());

        let negative = Factor::from_ratio(-2, 3).pow(-3).unwrap();
        assert_eq!(negative, Factor::from_ratio(-27, 8));
    }

    #[test]
    fn test_large_pow_is_fast() {
        let started = std::time::Instant::now();
        let big = Factor::from_ratio(1, 1000).pow(-100_000).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(big, Factor::from_i64(1000).pow(100_000).unwrap());
    }

    #[test]
    fn test_div_by_zero() {
        assert!(Factor::one().checked_div(&Factor::zero()).is_err());
    }

    #[test]
    fn test_to_f64() {
        let f: Factor = "141.5".parse().unwrap();
        assert_eq!(f.to_f64(), 141.5);
    }
}
