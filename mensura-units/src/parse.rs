//! Unit expression parsing - products and quotients like "N/kg/h" or "(m/s)/(kg/h)"
//!
//! Operators at the same nesting depth fold strictly left to right, so
//! `N/kg/h` reads as `(N/kg)/h`. Parentheses are the only way to group
//! differently. An exponent (`^2`, `^-1`, `²`, `⁻¹`) binds to the single
//! atomic symbol it follows; its magnitude may not exceed
//! [`MAX_EXPONENT`](crate::MAX_EXPONENT).
//!
//! Positions passed in and returned are byte offsets into the input.
//! Positions reported in errors are character offsets.

use mensura_core::{Bracket, UnitError};
use tracing::debug;

use crate::format::superscript_digit;
use crate::registry::UnitRegistry;
use crate::unit::MAX_EXPONENT;
use crate::Unit;

const DIVIDE: char = '/';
const MULTIPLY: char = '*';
const MIDDLE_DOT: char = '·';
const OPEN: char = '(';
const CLOSE: char = ')';

/// The next operand of a unit expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubExpression<'a> {
    /// Operand text; for a parenthesized group, the text between the
    /// outer parentheses
    pub text: &'a str,
    /// Bytes consumed from the start position, including outer parentheses
    pub consumed: usize,
    /// Whether the operand was a parenthesized group
    pub grouped: bool,
}

/// Extract the operand that starts at byte offset `start`.
///
/// - `kg/s` gives `kg`, consuming 2
/// - `(m/s)/kg` gives `m/s`, consuming 5
/// - `((m/s)/(kg/h))*N` gives `(m/s)/(kg/h)`, consuming 14
///
/// A bare operand runs up to the first `/`, `)`, `*` or `·`. Whitespace is
/// never trimmed. A group whose closing parenthesis is missing is an
/// `UnmatchedParenthesis` error located at the end of `text`, where the
/// `)` was expected.
pub fn extract_subexpression(text: &str, start: usize) -> Result<SubExpression<'_>, UnitError> {
    let rest = text
        .get(start..)
        .ok_or(UnitError::InvalidPosition { position: start })?;

    if let Some(inner) = rest.strip_prefix(OPEN) {
        let mut depth = 1usize;
        for (i, c) in inner.char_indices() {
            match c {
                OPEN => depth += 1,
                CLOSE => {
                    depth -= 1;
                    if depth == 0 {
                        let group = &inner[..i];
                        return Ok(SubExpression {
                            text: group,
                            consumed: group.len() + 2,
                            grouped: true,
                        });
                    }
                }
                _ => {}
            }
        }
        return Err(UnitError::UnmatchedParenthesis {
            bracket: Bracket::Open,
            index: char_index(text, text.len()),
        });
    }

    let end = rest
        .find(|c| matches!(c, DIVIDE | CLOSE | MULTIPLY | MIDDLE_DOT))
        .unwrap_or(rest.len());
    Ok(SubExpression {
        text: &rest[..end],
        consumed: end,
        grouped: false,
    })
}

/// Parse a product unit starting at byte offset `start`.
///
/// Returns the unit and the offset where parsing stopped: the end of input,
/// or an unconsumed `)` left for the caller. A `start` past the end or
/// inside a multi-byte character is an `InvalidPosition` error.
pub fn parse_product_unit(
    registry: &UnitRegistry,
    text: &str,
    start: usize,
) -> Result<(Unit, usize), UnitError> {
    if !text.is_char_boundary(start) {
        return Err(UnitError::InvalidPosition { position: start });
    }
    Parser { registry, text }.product(start, text.len())
}

/// Parse a complete unit expression. Trailing whitespace is ignored, an
/// empty string is the dimensionless unit, and any other leftover input is
/// an error.
pub fn parse_unit(registry: &UnitRegistry, text: &str) -> Result<Unit, UnitError> {
    let text = text.trim_end();
    if text.is_empty() {
        return Ok(Unit::one());
    }

    let result = parse_product_unit(registry, text, 0).and_then(|(unit, end)| {
        Parser { registry, text }.expect_end(end, text.len())?;
        Ok(unit)
    });

    if let Err(e) = &result {
        debug!(input = text, error = %e, "unit expression rejected");
    }
    result
}

struct Parser<'r, 't> {
    registry: &'r UnitRegistry,
    text: &'t str,
}

impl Parser<'_, '_> {
    /// Left fold of `operand (op operand)*` over `text[start..end]`
    fn product(&self, start: usize, end: usize) -> Result<(Unit, usize), UnitError> {
        let (mut unit, mut pos) = self.operand(start, end)?;

        while let Some(op) = self.text[pos..end].chars().next() {
            match op {
                MULTIPLY | MIDDLE_DOT => {
                    let (rhs, next) = self.operand(pos + op.len_utf8(), end)?;
                    unit = unit.multiply(&rhs)?;
                    pos = next;
                }
                DIVIDE => {
                    let (rhs, next) = self.operand(pos + op.len_utf8(), end)?;
                    unit = unit.divide(&rhs)?;
                    pos = next;
                }
                _ => break,
            }
        }

        Ok((unit, pos))
    }

    fn operand(&self, start: usize, end: usize) -> Result<(Unit, usize), UnitError> {
        let sub = extract_subexpression(&self.text[..end], start)?;

        if sub.grouped {
            let inner_start = start + 1;
            let inner_end = inner_start + sub.text.len();
            let (unit, stop) = self.product(inner_start, inner_end)?;
            self.expect_end(stop, inner_end)?;
            return Ok((unit, start + sub.consumed));
        }

        if sub.text.is_empty() {
            return Err(UnitError::MissingOperand {
                index: char_index(self.text, start),
            });
        }
        let unit = self.atom(sub.text, start)?;
        Ok((unit, start + sub.consumed))
    }

    /// A symbol with an optional `^n` or superscript exponent
    fn atom(&self, atom: &str, start: usize) -> Result<Unit, UnitError> {
        // (symbol, exponent text, parsed exponent, byte offset of the exponent)
        let (symbol, digits, exponent, exponent_at) = match atom.find('^') {
            Some(caret) => {
                let digits = &atom[caret + 1..];
                (&atom[..caret], digits, digits.parse::<i32>().ok(), caret)
            }
            None => {
                let (symbol, exponent) = split_superscript(atom);
                (symbol, &atom[symbol.len()..], Some(exponent), symbol.len())
            }
        };
        let exponent = exponent
            .filter(|e| e.unsigned_abs() <= MAX_EXPONENT.unsigned_abs())
            .ok_or_else(|| UnitError::InvalidExponent {
                exponent: digits.to_string(),
                index: char_index(self.text, start + exponent_at),
            })?;

        if symbol.is_empty() {
            return Err(UnitError::MissingOperand {
                index: char_index(self.text, start),
            });
        }
        if symbol == "1" {
            return Ok(Unit::one());
        }

        let def = self.registry.resolve_symbol(symbol).ok_or_else(|| UnitError::UnknownSymbol {
            symbol: symbol.to_string(),
            index: char_index(self.text, start),
        })?;
        Unit::from_def(def).pow(exponent)
    }

    /// Anything left in `text[pos..end]` is an error
    fn expect_end(&self, pos: usize, end: usize) -> Result<(), UnitError> {
        match self.text[pos..end].chars().next() {
            None => Ok(()),
            Some(CLOSE) => Err(UnitError::UnmatchedParenthesis {
                bracket: Bracket::Close,
                index: char_index(self.text, pos),
            }),
            Some(character) => Err(UnitError::UnexpectedCharacter {
                character,
                index: char_index(self.text, pos),
            }),
        }
    }
}

/// Split trailing superscript exponent digits (with optional `⁻`) off a symbol
fn split_superscript(atom: &str) -> (&str, i32) {
    let digits_start = atom
        .char_indices()
        .rev()
        .take_while(|(_, c)| superscript_digit(*c).is_some())
        .last()
        .map(|(i, _)| i);

    let Some(digits_start) = digits_start else {
        return (atom, 1);
    };

    let magnitude = atom[digits_start..]
        .chars()
        .filter_map(superscript_digit)
        .fold(0i32, |acc, d| acc.saturating_mul(10).saturating_add(d as i32));

    match atom[..digits_start].strip_suffix('⁻') {
        Some(symbol) => (symbol, -magnitude),
        None => (&atom[..digits_start], magnitude),
    }
}

fn char_index(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> UnitRegistry {
        UnitRegistry::standard()
    }

    fn canonical(expr: &str) -> String {
        parse_unit(&registry(), expr).unwrap().to_string()
    }

    fn error(expr: &str) -> UnitError {
        parse_unit(&registry(), expr).unwrap_err()
    }

    /// Input expression and its canonical form
    const DIVISION_UNITS: &[(&str, &str)] = &[
        // 1 divide
        ("N/kg", "N/kg"),
        // 2 divides
        ("N/kg/h", "N/(kg·h)"),
        ("(N/kg)/h", "N/(kg·h)"),
        ("N/(kg/h)", "N·h/kg"),
        ("N/(kg)/h", "N/(kg·h)"),
        // 1 divide + 1 multiply
        ("N*kg/h", "N·kg/h"),
        ("(N*kg)/h", "N·kg/h"),
        ("N*(kg/h)", "N·kg/h"),
        ("N*(kg)/h", "N·kg/h"),
        ("N/kg*h", "N·h/kg"),
        ("(N/kg)*h", "N·h/kg"),
        ("N/(kg*h)", "N/(kg·h)"),
        ("N/(kg)*h", "N·h/kg"),
        // 3 divides
        ("N/kg/m/h", "N/(kg·m·h)"),
        ("((N/kg)/m)/h", "N/(kg·m·h)"),
        ("(N/kg)/(m/h)", "N·h/(kg·m)"),
        ("N/(kg/(m/h))", "N·m/(kg·h)"),
        ("(N/kg)/m/h", "N/(kg·m·h)"),
        ("N/(kg/m)/h", "N·m/(kg·h)"),
        ("N/kg/(m/h)", "N·h/(kg·m)"),
        // 2 divides + 1 multiply
        ("N*kg/m/h", "N·kg/(m·h)"),
        ("N/kg*m/h", "N·m/(kg·h)"),
        ("N/kg/m*h", "N·h/(kg·m)"),
        ("(N*kg)/m/h", "N·kg/(m·h)"),
        ("(N/kg)*m/h", "N·m/(kg·h)"),
        ("(N/kg)/m*h", "N·h/(kg·m)"),
        ("N*(kg/m)/h", "N·kg/(m·h)"),
        ("N/(kg*m)/h", "N/(kg·m·h)"),
        ("N/(kg/m)*h", "N·m·h/kg"),
        ("N*kg/(m/h)", "N·kg·h/m"),
        ("N/kg*(m/h)", "N·m/(kg·h)"),
        ("N/kg/(m*h)", "N/(kg·m·h)"),
        // 1 divide + 2 multiplies
        ("N/kg*m*h", "N·m·h/kg"),
        ("N*kg/m*h", "N·kg·h/m"),
        ("N*kg*m/h", "N·kg·m/h"),
        ("(N/kg)*m*h", "N·m·h/kg"),
        ("(N*kg)/m*h", "N·kg·h/m"),
        ("(N*kg)*m/h", "N·kg·m/h"),
        ("N/(kg*m)*h", "N·h/(kg·m)"),
        ("N*(kg/m)*h", "N·kg·h/m"),
        ("N*(kg*m)/h", "N·kg·m/h"),
        ("N/kg*(m*h)", "N·m·h/kg"),
        ("N*kg/(m*h)", "N·kg/(m·h)"),
        ("N*kg*(m/h)", "N·kg·m/h"),
        // 3 divides total, 2 within ()
        ("(N/kg/m)/h", "N/(kg·m·h)"),
        ("N/(kg/m/h)", "N·m·h/kg"),
        // 4 divides
        ("N/kg/m/h/K", "N/(kg·m·h·K)"),
    ];

    #[test]
    fn test_extract_subexpression() {
        let sub = extract_subexpression("kg/s", 0).unwrap();
        assert_eq!((sub.text, sub.consumed, sub.grouped), ("kg", 2, false));

        let sub = extract_subexpression("(m/s)/kg ", 0).unwrap();
        assert_eq!((sub.text, sub.consumed, sub.grouped), ("m/s", 5, true));

        let sub = extract_subexpression("((m/s)/(kg/h))*N", 0).unwrap();
        assert_eq!((sub.text, sub.consumed), ("(m/s)/(kg/h)", 14));
    }

    #[test]
    fn test_extract_subexpression_from_offset() {
        let sub = extract_subexpression("N/kg·h", 2).unwrap();
        assert_eq!((sub.text, sub.consumed), ("kg", 2));

        // Stops at an unmatched ')' left behind by an enclosing group
        let sub = extract_subexpression("m/s)", 2).unwrap();
        assert_eq!((sub.text, sub.consumed), ("s", 1));

        // Whitespace is part of the operand
        let sub = extract_subexpression(" kg /s", 0).unwrap();
        assert_eq!(sub.text, " kg ");
    }

    #[test]
    fn test_extract_unclosed_group() {
        let err = extract_subexpression("(m/s", 0).unwrap_err();
        assert_eq!(err, UnitError::UnmatchedParenthesis { bracket: Bracket::Open, index: 4 });
    }

    #[test]
    fn test_parse_units_with_divisions() {
        let mut failures = Vec::new();

        for &(expr, expected) in DIVISION_UNITS {
            let variants = [
                (expr.to_string(), expected.to_string()),
                (expr.replace('*', "·"), expected.to_string()),
                (expr.replace('N', "N^2"), expected.replace('N', "N²")),
                (expr.replace("kg", "kg^2"), expected.replace("kg", "kg²")),
                (expr.replace("kg", "kg²"), expected.replace("kg", "kg²")),
                (expr.replace('h', "h^2"), expected.replace('h', "h²")),
                (expr.replace('m', "m^2"), expected.replace('m', "m²")),
            ];
            for (input, output) in variants {
                match parse_unit(&registry(), &input) {
                    Ok(unit) if unit.to_string() == output => {}
                    Ok(unit) => failures.push(format!("{} -> {} (expected {})", input, unit, output)),
                    Err(e) => failures.push(format!("{} -> error {}", input, e)),
                }
            }
        }

        assert!(failures.is_empty(), "mis-parsed expressions:\n{}", failures.join("\n"));
    }

    #[test]
    fn test_left_associative_division() {
        let registry = registry();
        let flat = parse_unit(&registry, "g/m/s").unwrap();
        let grouped = parse_unit(&registry, "(g/m)/s").unwrap();
        let built = parse_unit(&registry, "g").unwrap()
            .divide(&parse_unit(&registry, "m").unwrap())
            .unwrap()
            .divide(&parse_unit(&registry, "s").unwrap())
            .unwrap();
        assert_eq!(flat, built);
        assert_eq!(grouped, built);
        assert_ne!(flat, parse_unit(&registry, "g/(m/s)").unwrap());
    }

    #[test]
    fn test_unmatched_parentheses() {
        for (expr, index) in [("N/(g/s", 6), ("N/g)/s", 3), ("((N/g)/s", 8), ("(N/g))/s", 5)] {
            let err = error(expr);
            let message = err.to_string();
            assert!(message.contains("Unmatched parenthesis"), "{}: {}", expr, message);
            assert!(message.contains(&format!("index {}", index)), "{}: {}", expr, message);
        }
    }

    #[test]
    fn test_unmatched_parenthesis_bracket_kind() {
        assert!(matches!(error("N/(g/s"), UnitError::UnmatchedParenthesis { bracket: Bracket::Open, .. }));
        assert!(matches!(error("N/g)/s"), UnitError::UnmatchedParenthesis { bracket: Bracket::Close, .. }));
    }

    #[test]
    fn test_unknown_symbol_reports_index() {
        assert_eq!(
            error("N/furlong*h"),
            UnitError::UnknownSymbol { symbol: "furlong".to_string(), index: 2 }
        );
        // Indices count characters, not bytes
        assert_eq!(
            error("N·kg·xyz"),
            UnitError::UnknownSymbol { symbol: "xyz".to_string(), index: 5 }
        );
    }

    #[test]
    fn test_missing_operands() {
        assert_eq!(error("N//kg"), UnitError::MissingOperand { index: 2 });
        assert_eq!(error("/kg"), UnitError::MissingOperand { index: 0 });
        assert_eq!(error("N*"), UnitError::MissingOperand { index: 2 });
        assert_eq!(error("N/()"), UnitError::MissingOperand { index: 3 });
    }

    #[test]
    fn test_exponents() {
        assert_eq!(canonical("m^2"), "m²");
        assert_eq!(canonical("s^-1"), "1/s");
        assert_eq!(canonical("m⁻¹"), "1/m");
        assert_eq!(canonical("kg*m/s^2"), "kg·m/s²");
        assert_eq!(canonical("m·m"), "m²");
        assert_eq!(canonical("m/m"), "1");
        assert_eq!(canonical("m^10"), "m¹⁰");
        assert!(matches!(error("m^x"), UnitError::InvalidExponent { index: 1, .. }));
    }

    #[test]
    fn test_exponent_bounds() {
        assert_eq!(canonical("m^1024"), "m¹⁰²⁴");
        assert_eq!(canonical("m^-1024"), "1/m¹⁰²⁴");
        assert_eq!(
            error("1/m^-2147483648"),
            UnitError::InvalidExponent { exponent: "-2147483648".to_string(), index: 3 }
        );
        assert_eq!(
            error("N^2000000000"),
            UnitError::InvalidExponent { exponent: "2000000000".to_string(), index: 1 }
        );
        assert!(matches!(error("km^200000"), UnitError::InvalidExponent { index: 2, .. }));
        assert!(matches!(error("m^99999999999"), UnitError::InvalidExponent { index: 1, .. }));
        assert!(matches!(error("m¹⁰²⁵"), UnitError::InvalidExponent { index: 1, .. }));
    }

    #[test]
    fn test_combined_exponents_are_bounded() {
        assert_eq!(
            error("m^1024*m"),
            UnitError::ExponentOverflow { symbol: "m".to_string() }
        );
        assert_eq!(
            error("1/m^1024/m"),
            UnitError::ExponentOverflow { symbol: "m".to_string() }
        );
        assert_eq!(canonical("m^1024/m"), "m¹⁰²³");
    }

    #[test]
    fn test_start_position_is_validated() {
        let registry = registry();
        // Inside the two-byte '·'
        assert_eq!(
            parse_product_unit(&registry, "N·kg", 2).unwrap_err(),
            UnitError::InvalidPosition { position: 2 }
        );
        assert_eq!(
            parse_product_unit(&registry, "m", 5).unwrap_err(),
            UnitError::InvalidPosition { position: 5 }
        );
        assert_eq!(
            extract_subexpression("m", 5).unwrap_err(),
            UnitError::InvalidPosition { position: 5 }
        );
        assert_eq!(parse_product_unit(&registry, "N·kg", 3).unwrap().1, 5);
    }

    #[test]
    fn test_exponent_binds_to_atom_only() {
        // An exponent after a group is leftover input
        assert_eq!(
            error("(m/s)^2"),
            UnitError::UnexpectedCharacter { character: '^', index: 5 }
        );
    }

    #[test]
    fn test_dimensionless_one() {
        assert_eq!(canonical("1/s"), "1/s");
        assert!(parse_unit(&registry(), "1").unwrap().is_one());
        assert!(parse_unit(&registry(), "").unwrap().is_one());
    }

    #[test]
    fn test_trailing_whitespace_ignored() {
        assert_eq!(canonical("N/kg "), "N/kg");
    }

    #[test]
    fn test_parse_product_unit_stops_at_close() {
        let registry = registry();
        let (unit, end) = parse_product_unit(&registry, "m/s)*kg", 0).unwrap();
        assert_eq!(unit.to_string(), "m/s");
        assert_eq!(end, 3);

        let (unit, end) = parse_product_unit(&registry, "x*(kg/h)", 2).unwrap();
        assert_eq!(unit.to_string(), "kg/h");
        assert_eq!(end, 8);
    }

    #[test]
    fn test_canonical_round_trip() {
        let registry = registry();
        for &(expr, _) in DIVISION_UNITS {
            let once = parse_unit(&registry, expr).unwrap();
            let again = parse_unit(&registry, &once.to_string()).unwrap();
            assert_eq!(once, again, "{}", expr);
            assert_eq!(once.to_string(), again.to_string(), "{}", expr);
        }
    }

    #[test]
    fn test_split_superscript() {
        assert_eq!(split_superscript("kg²"), ("kg", 2));
        assert_eq!(split_superscript("m⁻¹²"), ("m", -12));
        assert_eq!(split_superscript("s"), ("s", 1));
    }
}
