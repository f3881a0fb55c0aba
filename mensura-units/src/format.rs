//! Canonical text form of compound units
//!
//! Positive-exponent terms come first, joined by `·`, followed by `/` and
//! the negative-exponent terms. The denominator is parenthesized only when
//! it holds more than one term. Exponents of 2 or more are written with
//! superscript digits: `N·m²/(kg·h)`.

use std::fmt;

use crate::unit::Term;

const MULTIPLY: char = '·';
const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

pub(crate) fn write_canonical(f: &mut fmt::Formatter<'_>, terms: &[Term]) -> fmt::Result {
    let (numerator, denominator): (Vec<&Term>, Vec<&Term>) = terms.iter().partition(|t| t.exponent() > 0);

    if numerator.is_empty() {
        write!(f, "1")?;
    } else {
        write_product(f, &numerator)?;
    }

    match denominator.len() {
        0 => Ok(()),
        1 => {
            write!(f, "/")?;
            write_product(f, &denominator)
        }
        _ => {
            write!(f, "/(")?;
            write_product(f, &denominator)?;
            write!(f, ")")
        }
    }
}

fn write_product(f: &mut fmt::Formatter<'_>, terms: &[&Term]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", MULTIPLY)?;
        }
        write!(f, "{}", term.symbol())?;
        let magnitude = term.exponent().unsigned_abs();
        if magnitude >= 2 {
            write!(f, "{}", superscript(magnitude))?;
        }
    }
    Ok(())
}

/// Render a non-negative integer with superscript digits
pub fn superscript(n: u32) -> String {
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| SUPERSCRIPT_DIGITS[d as usize])
        .collect()
}

/// Value of a superscript digit, if `c` is one
pub fn superscript_digit(c: char) -> Option<u32> {
    SUPERSCRIPT_DIGITS.iter().position(|&s| s == c).map(|d| d as u32)
}
