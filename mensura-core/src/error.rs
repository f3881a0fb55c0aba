//! Structured errors for unit parsing and conversion
//!
//! Every failure is reported synchronously to the caller. Parse errors carry
//! the absolute character index of the offending token in the original input.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNMATCHED_PARENTHESIS: &str = "UNMATCHED_PARENTHESIS";
    pub const MISSING_OPERAND: &str = "MISSING_OPERAND";
    pub const INVALID_EXPONENT: &str = "INVALID_EXPONENT";
    pub const UNEXPECTED_CHARACTER: &str = "UNEXPECTED_CHARACTER";
    pub const UNKNOWN_SYMBOL: &str = "UNKNOWN_SYMBOL";
    pub const INCOMMENSURABLE: &str = "INCOMMENSURABLE";
    pub const NON_PROPORTIONAL: &str = "NON_PROPORTIONAL";
    pub const DUPLICATE_SYMBOL: &str = "DUPLICATE_SYMBOL";
    pub const ZERO_SCALE: &str = "ZERO_SCALE";
    pub const INVALID_NUMBER: &str = "INVALID_NUMBER";
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const EXPONENT_OVERFLOW: &str = "EXPONENT_OVERFLOW";
    pub const INVALID_POSITION: &str = "INVALID_POSITION";
    pub const CACHE_CORRUPTION: &str = "CACHE_CORRUPTION";
}

/// Which side of a parenthesis pair is missing its partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bracket {
    Open,
    Close,
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bracket::Open => write!(f, "("),
            Bracket::Close => write!(f, ")"),
        }
    }
}

/// Error type for unit parsing, registration and conversion
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitError {
    #[error("Unmatched parenthesis '{bracket}' at index {index}")]
    UnmatchedParenthesis { bracket: Bracket, index: usize },

    #[error("Missing unit operand at index {index}")]
    MissingOperand { index: usize },

    #[error("Invalid exponent '{exponent}' at index {index}")]
    InvalidExponent { exponent: String, index: usize },

    #[error("Unexpected character '{character}' at index {index}")]
    UnexpectedCharacter { character: char, index: usize },

    #[error("Unknown unit symbol '{symbol}' at index {index}")]
    UnknownSymbol { symbol: String, index: usize },

    #[error("Cannot convert {from} to {to}: incommensurable units")]
    IncommensurableUnits { from: String, to: String },

    #[error("Unit '{symbol}' has a non-proportional conversion and cannot be part of a product")]
    NonProportionalTerm { symbol: String },

    #[error("Unit symbol '{symbol}' is already defined")]
    DuplicateSymbol { symbol: String },

    #[error("Scale factor must be non-zero")]
    ZeroScale,

    #[error("Invalid number format: {input}")]
    InvalidNumber { input: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Exponent of '{symbol}' is out of range")]
    ExponentOverflow { symbol: String },

    #[error("Start position {position} is not a character boundary of the input")]
    InvalidPosition { position: usize },

    /// Internal invariant violation in the converter cache. Not reachable
    /// through the public API.
    #[error("Converter cache corrupted: {reason}")]
    CacheCorruption { reason: String },
}

impl UnitError {
    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            UnitError::UnmatchedParenthesis { .. } => codes::UNMATCHED_PARENTHESIS,
            UnitError::MissingOperand { .. } => codes::MISSING_OPERAND,
            UnitError::InvalidExponent { .. } => codes::INVALID_EXPONENT,
            UnitError::UnexpectedCharacter { .. } => codes::UNEXPECTED_CHARACTER,
            UnitError::UnknownSymbol { .. } => codes::UNKNOWN_SYMBOL,
            UnitError::IncommensurableUnits { .. } => codes::INCOMMENSURABLE,
            UnitError::NonProportionalTerm { .. } => codes::NON_PROPORTIONAL,
            UnitError::DuplicateSymbol { .. } => codes::DUPLICATE_SYMBOL,
            UnitError::ZeroScale => codes::ZERO_SCALE,
            UnitError::InvalidNumber { .. } => codes::INVALID_NUMBER,
            UnitError::InvalidConfig { .. } => codes::INVALID_CONFIG,
            UnitError::ExponentOverflow { .. } => codes::EXPONENT_OVERFLOW,
            UnitError::InvalidPosition { .. } => codes::INVALID_POSITION,
            UnitError::CacheCorruption { .. } => codes::CACHE_CORRUPTION,
        }
    }

    /// Character index in the parsed input, for parse-time errors
    pub fn index(&self) -> Option<usize> {
        match self {
            UnitError::UnmatchedParenthesis { index, .. }
            | UnitError::MissingOperand { index }
            | UnitError::InvalidExponent { index, .. }
            | UnitError::UnexpectedCharacter { index, .. }
            | UnitError::UnknownSymbol { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// True for errors raised while reading an expression
    pub fn is_parse_error(&self) -> bool {
        self.index().is_some()
    }
}
